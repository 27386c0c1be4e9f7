//! Per-query and per-mutation options, with the presets the dashboard uses.

use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);

/// Per-query cache policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful fetch is served without refetching
    pub stale_time: Duration,
    /// How long an idle entry survives [`super::QueryClient::collect_garbage`]
    pub cache_time: Duration,
    /// Extra attempts after the first failure
    pub retry: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    pub refetch_on_window_focus: bool,
    pub refetch_on_mount: bool,
    pub refetch_on_reconnect: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: 5 * MINUTE,
            cache_time: 5 * MINUTE,
            retry: 1,
            retry_delay: Duration::from_secs(1),
            refetch_on_window_focus: false,
            refetch_on_mount: false,
            refetch_on_reconnect: true,
        }
    }
}

impl QueryOptions {
    /// Dashboard panels: data changes slowly
    pub fn dashboard() -> Self {
        Self {
            stale_time: 10 * MINUTE,
            cache_time: 15 * MINUTE,
            ..Self::default()
        }
    }

    /// Single records looked up by id
    pub fn individual() -> Self {
        Self {
            stale_time: 5 * MINUTE,
            cache_time: 10 * MINUTE,
            ..Self::default()
        }
    }

    /// Auth-adjacent lookups (availability checks, profiles)
    pub fn auth() -> Self {
        Self {
            stale_time: 2 * MINUTE,
            cache_time: 2 * MINUTE,
            ..Self::default()
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }

    pub fn with_retry(mut self, retry: u32, retry_delay: Duration) -> Self {
        self.retry = retry;
        self.retry_delay = retry_delay;
        self
    }

    /// Whether entries under these options react to `trigger`
    pub fn refetches_on(&self, trigger: RefetchTrigger) -> bool {
        match trigger {
            RefetchTrigger::WindowFocus => self.refetch_on_window_focus,
            RefetchTrigger::Mount => self.refetch_on_mount,
            RefetchTrigger::Reconnect => self.refetch_on_reconnect,
        }
    }
}

/// Environmental events that may mark entries stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchTrigger {
    /// The UI regained focus
    WindowFocus,
    /// A consumer of the data was (re)created
    Mount,
    /// Network connectivity came back
    Reconnect,
}

/// Mutation retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOptions {
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self {
            retry: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}
