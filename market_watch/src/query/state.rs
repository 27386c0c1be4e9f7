//! What a read of the cache returns, and how several reads combine.

use crate::net::errors::ApiError;
use std::sync::Arc;
use tokio::time::Instant;

/// Observable state of one query
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successful value, possibly stale
    pub data: Option<Arc<T>>,
    /// No data yet and a fetch is running
    pub is_loading: bool,
    /// A fetch is running (first load or background refetch)
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<ApiError>,
    /// Outside its freshness window or invalidated; the next read refetches
    pub is_stale: bool,
    /// When `data` was fetched or seeded
    pub updated_at: Option<Instant>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_error: self.is_error,
            error: self.error.clone(),
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    /// Nothing fetched and nothing running (e.g. a disabled query)
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_fetching: false,
            is_error: false,
            error: None,
            is_stale: true,
            updated_at: None,
        }
    }

    pub fn success(data: Arc<T>, updated_at: Instant) -> Self {
        Self {
            data: Some(data),
            is_stale: false,
            updated_at: Some(updated_at),
            ..Self::idle()
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            is_error: true,
            error: Some(error),
            ..Self::idle()
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Has data and no error
    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.is_error
    }

    /// Same status with the data replaced
    pub fn map_data<S>(&self, data: Option<Arc<S>>) -> QueryState<S> {
        QueryState {
            data,
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_error: self.is_error,
            error: self.error.clone(),
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

/// Loading/error view shared by every query state
pub trait QueryStatus {
    fn is_loading(&self) -> bool;
    fn is_error(&self) -> bool;
    fn error(&self) -> Option<&ApiError>;
}

impl<T> QueryStatus for QueryState<T> {
    fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn is_error(&self) -> bool {
        self.is_error
    }

    fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }
}

/// Combined status of several queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeStatus {
    /// Any constituent loading
    pub is_loading: bool,
    /// Any constituent errored
    pub is_error: bool,
    /// Error of the first errored constituent, in the order given
    pub error: Option<ApiError>,
}

impl CompositeStatus {
    pub fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn QueryStatus>,
    {
        parts
            .into_iter()
            .fold(Self::default(), |mut acc, part| {
                acc.is_loading |= part.is_loading();
                acc.is_error |= part.is_error();
                if acc.error.is_none() {
                    acc.error = part.error().cloned();
                }
                acc
            })
    }
}
