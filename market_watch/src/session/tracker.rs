//! Session countdown state machine.
//!
//! The tracker is a pure function of `(previous state, now, token present)`.
//! It owns no clock and no task; [`super::monitor`] drives it.

use std::time::Duration;
use tokio::time::Instant;

/// Countdown phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token observed on the last tick
    NoToken,
    /// Counting down from `started_at`
    Counting { started_at: Instant },
    /// Window elapsed; terminal until [`ExpiryTracker::reset`]
    Expired,
}

/// Snapshot published after every tick
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryInfo {
    /// Whole seconds left, rounded up
    pub remaining_time: u64,
    pub is_expired: bool,
    /// Share of the window left, in `[0, 100]`
    pub percentage: f64,
    /// `"Xm Ys"`, or `"Ys"` under a minute
    pub time_display: String,
}

impl ExpiryInfo {
    /// State before the first tick
    pub fn initial() -> Self {
        Self {
            remaining_time: 0,
            is_expired: false,
            percentage: 0.0,
            time_display: format_remaining(0),
        }
    }

    fn expired() -> Self {
        Self {
            is_expired: true,
            ..Self::initial()
        }
    }
}

impl Default for ExpiryInfo {
    fn default() -> Self {
        Self::initial()
    }
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub info: ExpiryInfo,
    /// True only on the tick where `is_expired` flips from false to true
    pub expired_edge: bool,
}

#[derive(Debug, Clone)]
pub struct ExpiryTracker {
    window: Duration,
    phase: SessionPhase,
    last: ExpiryInfo,
}

impl ExpiryTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            phase: SessionPhase::NoToken,
            last: ExpiryInfo::initial(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Snapshot from the most recent tick
    pub fn info(&self) -> &ExpiryInfo {
        &self.last
    }

    /// Advance the state machine
    ///
    /// # Arguments
    ///
    /// * `now` - Clock time of this tick
    /// * `token_present` - Whether a token is stored right now
    /// * `started_at` - Countdown start to use when counting begins on this
    ///   tick; `None` starts the countdown at `now`
    pub fn tick(
        &mut self,
        now: Instant,
        token_present: bool,
        started_at: Option<Instant>,
    ) -> TickOutcome {
        let info = if !token_present {
            self.phase = SessionPhase::NoToken;
            ExpiryInfo::expired()
        } else {
            match self.phase {
                SessionPhase::NoToken => {
                    let start = started_at.map_or(now, |s| s.min(now));
                    self.count_from(start, now)
                }
                SessionPhase::Counting { started_at } => self.count_from(started_at, now),
                SessionPhase::Expired => ExpiryInfo::expired(),
            }
        };

        let expired_edge = info.is_expired && !self.last.is_expired;
        self.last = info.clone();
        TickOutcome { info, expired_edge }
    }

    /// Forget the current countdown; the next tick with a token starts a new one
    pub fn reset(&mut self) {
        self.phase = SessionPhase::NoToken;
        self.last = ExpiryInfo::initial();
    }

    fn count_from(&mut self, started_at: Instant, now: Instant) -> ExpiryInfo {
        let info = remaining_info(self.window, now.saturating_duration_since(started_at));
        self.phase = if info.is_expired {
            SessionPhase::Expired
        } else {
            SessionPhase::Counting { started_at }
        };
        info
    }
}

/// Countdown snapshot after `elapsed` of a `window`
pub fn remaining_info(window: Duration, elapsed: Duration) -> ExpiryInfo {
    let remaining = window.saturating_sub(elapsed);
    let remaining_time = u64::try_from(remaining.as_millis().div_ceil(1000)).unwrap_or(u64::MAX);
    let percentage = if window.is_zero() {
        0.0
    } else {
        (remaining.as_secs_f64() / window.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    };

    ExpiryInfo {
        remaining_time,
        is_expired: remaining.is_zero(),
        percentage,
        time_display: format_remaining(remaining_time),
    }
}

/// Render whole seconds as `"Xm Ys"`, or `"Ys"` under a minute
pub fn format_remaining(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1800);

    #[test]
    fn test_half_window_elapsed() {
        let info = remaining_info(WINDOW, Duration::from_secs(900));
        assert_eq!(info.remaining_time, 900);
        assert!((info.percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(info.time_display, "15m 0s");
        assert!(!info.is_expired);
    }

    #[test]
    fn test_remaining_rounds_up() {
        let info = remaining_info(WINDOW, Duration::from_millis(1_799_001));
        assert_eq!(info.remaining_time, 1);
        assert_eq!(info.time_display, "1s");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0s");
        assert_eq!(format_remaining(59), "59s");
        assert_eq!(format_remaining(60), "1m 0s");
        assert_eq!(format_remaining(1800), "30m 0s");
    }

    #[test]
    fn test_starts_counting_on_first_token() {
        let t0 = Instant::now();
        let mut tracker = ExpiryTracker::new(WINDOW);

        let first = tracker.tick(t0, true, None);
        assert_eq!(tracker.phase(), SessionPhase::Counting { started_at: t0 });
        assert_eq!(first.info.remaining_time, 1800);
        assert!(!first.expired_edge);

        let later = tracker.tick(t0 + Duration::from_secs(60), true, None);
        assert_eq!(later.info.remaining_time, 1740);
        assert_eq!(later.info.time_display, "29m 0s");
    }

    #[test]
    fn test_edge_fires_once() {
        let t0 = Instant::now();
        let mut tracker = ExpiryTracker::new(Duration::from_secs(3));

        tracker.tick(t0, true, None);
        assert!(!tracker.tick(t0 + Duration::from_secs(2), true, None).expired_edge);

        let expiry = tracker.tick(t0 + Duration::from_secs(3), true, None);
        assert!(expiry.info.is_expired);
        assert!(expiry.expired_edge);
        assert_eq!(tracker.phase(), SessionPhase::Expired);

        let held = tracker.tick(t0 + Duration::from_secs(4), true, None);
        assert!(held.info.is_expired);
        assert!(!held.expired_edge);
    }

    #[test]
    fn test_missing_token_reports_expired() {
        let t0 = Instant::now();
        let mut tracker = ExpiryTracker::new(WINDOW);
        tracker.tick(t0, true, None);

        let gone = tracker.tick(t0 + Duration::from_secs(1), false, None);
        assert!(gone.info.is_expired);
        assert_eq!(tracker.phase(), SessionPhase::NoToken);

        // A new token starts a fresh countdown.
        let t1 = t0 + Duration::from_secs(5);
        let back = tracker.tick(t1, true, None);
        assert!(!back.info.is_expired);
        assert_eq!(back.info.remaining_time, 1800);
    }

    #[test]
    fn test_reset_leaves_expired() {
        let t0 = Instant::now();
        let mut tracker = ExpiryTracker::new(Duration::from_secs(1));
        tracker.tick(t0, true, None);
        tracker.tick(t0 + Duration::from_secs(2), true, None);
        assert_eq!(tracker.phase(), SessionPhase::Expired);

        tracker.reset();
        let restarted = tracker.tick(t0 + Duration::from_secs(3), true, None);
        assert!(!restarted.info.is_expired);
        assert!(!restarted.expired_edge);
    }

    #[test]
    fn test_explicit_start_is_honoured() {
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(600);
        let mut tracker = ExpiryTracker::new(WINDOW);

        let outcome = tracker.tick(now, true, Some(t0));
        assert_eq!(outcome.info.remaining_time, 1200);
    }
}
