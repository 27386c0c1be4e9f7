//! Background sweep dropping idle cache entries.

use super::QueryClient;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

/// Default interval between sweeps
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running sweep; dropping it aborts the task.
#[derive(Debug)]
pub struct CacheCollector {
    task: JoinHandle<()>,
}

impl CacheCollector {
    /// Spawn a task calling [`QueryClient::collect_garbage`] every `period`
    ///
    /// A zero period is raised to one millisecond.
    pub fn spawn(cache: QueryClient, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let collected = cache.collect_garbage().await;
                if collected > 0 {
                    log::debug!("Cache sweep dropped {} entries", collected);
                }
            }
        });
        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for CacheCollector {
    fn drop(&mut self) {
        self.task.abort();
    }
}
