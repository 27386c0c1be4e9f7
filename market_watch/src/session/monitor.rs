//! Background task ticking the session countdown.

use super::{
    ExpiryAnchor, token_issued_at,
    tracker::{ExpiryInfo, ExpiryTracker},
};
use crate::{
    auth::CredentialStore,
    config::SessionConfig,
    net::navigator::{LogoutReason, Navigator},
};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};

/// Shortest accepted tick; a zero tick would stall the interval
const MIN_TICK: Duration = Duration::from_millis(1);

/// Handle to a running countdown.
///
/// Dropping the handle aborts the task, so the countdown lives exactly as
/// long as whatever owns the handle.
#[derive(Debug)]
pub struct SessionMonitor {
    info: watch::Receiver<ExpiryInfo>,
    task: JoinHandle<()>,
}

impl SessionMonitor {
    /// Spawn the countdown task
    ///
    /// # Arguments
    ///
    /// * `config` - Window, tick interval and anchor
    /// * `credentials` - Polled on every tick for the token
    /// * `navigator` - Invoked once when the countdown expires
    /// * `logins` - Bumped on every successful login; each change restarts the countdown
    pub fn spawn(
        config: SessionConfig,
        credentials: CredentialStore,
        navigator: Arc<dyn Navigator>,
        logins: watch::Receiver<u64>,
    ) -> Self {
        let (info_tx, info_rx) = watch::channel(ExpiryInfo::initial());
        let task = tokio::spawn(run(config, credentials, navigator, logins, info_tx));
        Self {
            info: info_rx,
            task,
        }
    }

    /// Latest published snapshot
    pub fn info(&self) -> ExpiryInfo {
        self.info.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ExpiryInfo> {
        self.info.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    config: SessionConfig,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
    mut logins: watch::Receiver<u64>,
    info_tx: watch::Sender<ExpiryInfo>,
) {
    let mut tracker = ExpiryTracker::new(config.window);
    if config.tick < MIN_TICK {
        log::warn!("Session tick {:?} too short; using {:?}", config.tick, MIN_TICK);
    }
    let mut ticker = interval(config.tick.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log::info!(
        "Session monitor started (window {}s, tick {}ms)",
        config.window.as_secs(),
        config.tick.as_millis()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = logins.changed() => {
                if changed.is_err() {
                    log::debug!("Login channel closed; stopping session monitor");
                    break;
                }
                tracker.reset();
            }
        }

        let now = Instant::now();
        let token = credentials.token();
        let started_at = match config.anchor {
            ExpiryAnchor::FirstObservation => None,
            ExpiryAnchor::IssuedAtClaim => token
                .as_deref()
                .and_then(token_issued_at)
                .and_then(|iat| (Utc::now() - iat).to_std().ok())
                .and_then(|age| now.checked_sub(age)),
        };

        let outcome = tracker.tick(now, token.is_some(), started_at);
        info_tx.send_replace(outcome.info);

        if outcome.expired_edge && credentials.is_authenticated() {
            log::warn!("Session expired; logging out");
            if let Err(e) = credentials.clear() {
                log::error!("Failed to clear credentials on expiry: {}", e);
            }
            navigator
                .navigate_to_root(LogoutReason::SessionExpired)
                .await;
        }
    }
}
