//! Process-wide query cache.
//!
//! Entries are keyed by [`QueryKey`] and hold a type-erased value. A fetch
//! runs in its own task and writes back to its own key only; concurrent
//! reads of one key join the same in-flight fetch. [`QueryClient::invalidate_all`]
//! bumps an epoch so fetches started before the reset never write back.

use super::{
    key::QueryKey,
    options::{QueryOptions, RefetchTrigger},
    state::QueryState,
};
use crate::net::errors::{ApiError, ErrorCode};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::{
    any::Any,
    collections::HashMap,
    fmt::Display,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::RwLock,
    time::{Instant, sleep},
};

type ErasedValue = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<ErasedValue, ApiError>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;
type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

struct CacheEntry {
    value: Option<ErasedValue>,
    updated_at: Option<Instant>,
    /// Last time the entry was read, seeded or settled; drives garbage collection
    touched_at: Instant,
    error: Option<ApiError>,
    options: QueryOptions,
    invalidated: bool,
    fetcher: Option<ErasedFetcher>,
    in_flight: Option<InFlight>,
    fetch_id: u64,
}

impl CacheEntry {
    fn new(options: QueryOptions) -> Self {
        Self {
            value: None,
            updated_at: None,
            touched_at: Instant::now(),
            error: None,
            options,
            invalidated: false,
            fetcher: None,
            in_flight: None,
            fetch_id: 0,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        match (&self.value, self.updated_at) {
            (Some(_), Some(updated_at)) => {
                !self.invalidated
                    && self.error.is_none()
                    && now.saturating_duration_since(updated_at) < self.options.stale_time
            }
            _ => false,
        }
    }

    /// Failed after all retries and nothing has asked for a retry since
    fn is_settled_error(&self) -> bool {
        self.error.is_some() && !self.invalidated && self.in_flight.is_none()
    }

    fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let (data, type_error) = match &self.value {
            Some(value) => match downcast::<T>(key, value.clone()) {
                Ok(data) => (Some(data), None),
                Err(e) => (None, Some(e)),
            },
            None => (None, None),
        };
        let error = type_error.or_else(|| self.error.clone());
        let fetching = self.in_flight.is_some();

        QueryState {
            is_loading: fetching && data.is_none(),
            is_fetching: fetching,
            is_error: error.is_some(),
            error,
            data,
            is_stale: !self.is_fresh(Instant::now()),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Default)]
struct Inner {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    epoch: AtomicU64,
    fetch_seq: AtomicU64,
    default_options: QueryOptions,
}

impl Inner {
    async fn complete(&self, key: &QueryKey, fetch_id: u64, epoch: u64, result: &FetchResult) {
        let mut entries = self.entries.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            log::debug!("[{}] discarding result fetched before cache reset", key);
            return;
        }
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.fetch_id != fetch_id {
            return;
        }

        entry.in_flight = None;
        entry.touched_at = Instant::now();
        match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.updated_at = Some(entry.touched_at);
                entry.error = None;
            }
            Err(e) => {
                log::error!("[{}] query failed: {}", key, e);
                entry.error = Some(e.clone());
            }
        }
    }
}

/// Shared handle to the cache; clones refer to the same cache
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose seeded entries use `options`
    pub fn with_default_options(options: QueryOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                default_options: options,
                ..Inner::default()
            }),
        }
    }

    pub fn default_options(&self) -> &QueryOptions {
        &self.inner.default_options
    }

    /// Read a query
    ///
    /// Fresh data is returned immediately. Stale data is returned at once
    /// while a background refetch runs. Without data the call waits for the
    /// first load. An entry that failed after its retries is returned as-is
    /// until something invalidates or refetches it.
    pub async fn query<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let pending = {
            let mut entries = self.inner.entries.write().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(options.clone()));
            entry.options = options;
            entry.touched_at = Instant::now();
            let fetcher = erase(fetcher);
            entry.fetcher = Some(fetcher.clone());

            if entry.is_fresh(Instant::now()) || entry.is_settled_error() {
                return entry.state(key);
            }

            let in_flight = self.start_fetch(key, entry, fetcher);
            if entry.value.is_some() {
                log::debug!("[{}] serving stale data while refetching", key);
                return entry.state(key);
            }
            in_flight
        };

        settle(key, pending.await)
    }

    /// Force a fetch with the fetcher from the last read of `key`
    pub async fn refetch<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let pending = {
            let mut entries = self.inner.entries.write().await;
            let Some(entry) = entries.get_mut(key) else {
                return QueryState::failure(never_read(key));
            };
            let Some(fetcher) = entry.fetcher.clone() else {
                return QueryState::failure(never_read(key));
            };
            self.start_fetch(key, entry, fetcher)
        };

        settle(key, pending.await)
    }

    /// Observe a key without triggering a fetch
    pub async fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .map_or_else(QueryState::idle, |entry| entry.state(key))
    }

    /// Cached value, fresh or stale
    pub async fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.inner.entries.read().await;
        let value = entries.get(key)?.value.clone()?;
        downcast(key, value).ok()
    }

    /// Seed an entry as freshly fetched
    pub async fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let mut entries = self.inner.entries.write().await;
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(self.inner.default_options.clone()));
        let now = Instant::now();
        entry.value = Some(Arc::new(value));
        entry.updated_at = Some(now);
        entry.touched_at = now;
        entry.error = None;
        entry.invalidated = false;
    }

    /// Mark every entry under `name` stale; returns how many were marked
    pub async fn invalidate(&self, name: &str) -> usize {
        let mut entries = self.inner.entries.write().await;
        let mut marked = 0;
        for (_, entry) in entries.iter_mut().filter(|(key, _)| key.name() == name) {
            entry.invalidated = true;
            marked += 1;
        }
        log::debug!("Invalidated {} entries under {}", marked, name);
        marked
    }

    /// Mark a single entry stale
    pub async fn invalidate_key(&self, key: &QueryKey) -> bool {
        let mut entries = self.inner.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Drop every entry; fetches in flight will not write back
    pub async fn invalidate_all(&self) {
        let mut entries = self.inner.entries.write().await;
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let dropped = entries.len();
        entries.clear();
        log::info!("Query cache cleared ({} entries)", dropped);
    }

    /// Mark stale every entry whose options react to `trigger`
    pub async fn notify(&self, trigger: RefetchTrigger) -> usize {
        let mut entries = self.inner.entries.write().await;
        let mut marked = 0;
        for entry in entries
            .values_mut()
            .filter(|entry| entry.options.refetches_on(trigger))
        {
            entry.invalidated = true;
            marked += 1;
        }
        marked
    }

    /// Drop idle entries untouched for longer than their cache time.
    ///
    /// [`super::CacheCollector`] runs this on an interval.
    pub async fn collect_garbage(&self) -> usize {
        let mut entries = self.inner.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.in_flight.is_some()
                || now.saturating_duration_since(entry.touched_at) < entry.options.cache_time
        });
        let collected = before - entries.len();
        if collected > 0 {
            log::debug!("Collected {} idle cache entries", collected);
        }
        collected
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Join the running fetch for `entry` or start one
    fn start_fetch(&self, key: &QueryKey, entry: &mut CacheEntry, fetcher: ErasedFetcher) -> InFlight {
        if let Some(in_flight) = &entry.in_flight {
            return in_flight.clone();
        }

        let fetch_id = self.inner.fetch_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        entry.fetch_id = fetch_id;
        entry.invalidated = false;

        let retry = entry.options.retry;
        let retry_delay = entry.options.retry_delay;
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();

        // The task owns the write-back, so a background refetch completes
        // even when nobody awaits it.
        let task = tokio::spawn(async move {
            let result = with_retry(&task_key, retry, retry_delay, || fetcher()).await;
            inner.complete(&task_key, fetch_id, epoch, &result).await;
            result
        });

        let in_flight = async move {
            task.await
                .unwrap_or_else(|e| Err(ApiError::unknown(format!("Query task failed: {e}"))))
        }
        .boxed()
        .shared();
        entry.in_flight = Some(in_flight.clone());
        in_flight
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("epoch", &self.inner.epoch.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Run `attempt` up to `retry + 1` times, pausing `delay` between attempts.
///
/// A 401 is never retried: the gateway has already ended the session.
pub(crate) async fn with_retry<T, L, F, Fut>(
    label: &L,
    retry: u32,
    delay: Duration,
    mut attempt: F,
) -> Result<T, ApiError>
where
    L: Display + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut failures = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if failures < retry && !e.is_unauthorized() => {
                failures += 1;
                log::warn!(
                    "[{}] attempt {} failed: {}; retrying in {}ms",
                    label,
                    failures,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn erase<T, F, Fut>(fetcher: F) -> ErasedFetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move { fut.await.map(|value| Arc::new(value) as ErasedValue) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: ErasedValue) -> Result<Arc<T>, ApiError> {
    value.downcast::<T>().map_err(|_| {
        log::error!("[{}] cached value is not a {}", key, std::any::type_name::<T>());
        ApiError::new(
            ErrorCode::UnknownError,
            format!(
                "Cached value for {key} is not a {}",
                std::any::type_name::<T>()
            ),
        )
    })
}

fn settle<T: Send + Sync + 'static>(key: &QueryKey, result: FetchResult) -> QueryState<T> {
    match result.and_then(|value| downcast::<T>(key, value)) {
        Ok(data) => QueryState::success(data, Instant::now()),
        Err(e) => QueryState::failure(e),
    }
}

fn never_read(key: &QueryKey) -> ApiError {
    ApiError::unknown(format!("Query {key} has never been read"))
}
