//! Structured logging for the dashboard client.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up alongside native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging
///
/// The level comes from `RUST_LOG` (default `info`, with the HTTP stack
/// held at `warn`).
///
/// # Example
///
/// ```no_run
/// use mw_client::logging;
///
/// logging::init();
/// tracing::info!("Client starting");
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Logging initialized");
}

/// Log a security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event, e.g. `session_expired`
/// * `username` - Optional username involved
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use mw_client::logging::log_security_event;
///
/// log_security_event("forced_logout", Some("analyst"), "Session expired");
/// ```
pub fn log_security_event(event_type: &str, username: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        username = username,
        "SECURITY: {}",
        message
    );
}

/// Log a completed client operation
///
/// # Arguments
///
/// * `operation` - Operation name, e.g. `dashboard_load`
/// * `duration_ms` - Duration in milliseconds
/// * `failed` - Number of constituent requests that failed
pub fn log_api_request(operation: &str, duration_ms: u64, failed: usize) {
    if failed > 0 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            failed = failed,
            "Operation completed with failures"
        );
    } else if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed"
        );
    }
}
