//! Manual dashboard refresh.

use super::queries::DASHBOARD_QUERIES;
use crate::query::QueryClient;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::time::sleep;

/// Default time the busy flag outlives the invalidation
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

/// Invalidates every dashboard query on request.
///
/// Only one refresh runs at a time; a request made while one is running is
/// ignored.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    cache: QueryClient,
    busy: Arc<AtomicBool>,
    cooldown: Duration,
}

/// Clears the busy flag however the refresh ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshCoordinator {
    pub fn new(cache: QueryClient, cooldown: Duration) -> Self {
        Self {
            cache,
            busy: Arc::new(AtomicBool::new(false)),
            cooldown,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark every dashboard query stale
    ///
    /// Returns `false` without doing anything if a refresh is already running.
    /// The next read of each query refetches it.
    pub async fn refresh(&self) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Refresh already running; ignoring request");
            return false;
        }
        let _guard = BusyGuard(&self.busy);

        let mut marked = 0;
        for name in DASHBOARD_QUERIES {
            marked += self.cache.invalidate(name).await;
        }
        log::info!("Dashboard refresh: {} queries marked stale", marked);

        sleep(self.cooldown).await;
        true
    }
}
