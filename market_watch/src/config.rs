//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use crate::{query::DEFAULT_GC_INTERVAL, session::ExpiryAnchor};
use std::{path::PathBuf, time::Duration};

/// Default REST base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL, including the `/api` prefix
    pub api_base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Session countdown configuration
    pub session: SessionConfig,
    /// Cosmetic delay the refresh coordinator stays busy for
    pub refresh_cooldown: Duration,
    /// Credential file; `None` keeps credentials in memory only
    pub credentials_path: Option<PathBuf>,
    /// Interval between sweeps of idle cache entries
    pub cache_gc_interval: Duration,
}

/// Session countdown configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Length of the session window
    pub window: Duration,
    /// Interval between countdown ticks
    pub tick: Duration,
    /// Where the countdown starts from
    pub anchor: ExpiryAnchor,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(1800),
            tick: Duration::from_secs(1),
            anchor: ExpiryAnchor::FirstObservation,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            session: SessionConfig::default(),
            refresh_cooldown: Duration::from_millis(500),
            credentials_path: None,
            cache_gc_interval: DEFAULT_GC_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `base_url_override` - Optional base URL override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ClientConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if `SESSION_ANCHOR` names an unknown anchor
    pub fn from_env(base_url_override: Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = base_url_override
            .or_else(|| std::env::var("API_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let anchor = match std::env::var("SESSION_ANCHOR") {
            Ok(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                var: "SESSION_ANCHOR".to_string(),
                reason,
            })?,
            Err(_) => ExpiryAnchor::FirstObservation,
        };

        let session = SessionConfig {
            window: Duration::from_secs(parse_env_or("SESSION_WINDOW_SECS", 1800)),
            tick: Duration::from_millis(parse_env_or("SESSION_TICK_MILLIS", 1000)),
            anchor,
        };

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(parse_env_or("API_TIMEOUT_SECS", 10)),
            session,
            refresh_cooldown: Duration::from_millis(parse_env_or("REFRESH_COOLDOWN_MILLIS", 500)),
            credentials_path: std::env::var("CREDENTIALS_PATH").ok().map(PathBuf::from),
            cache_gc_interval: Duration::from_secs(parse_env_or(
                "CACHE_GC_SECS",
                DEFAULT_GC_INTERVAL.as_secs(),
            )),
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                var: "API_BASE_URL".to_string(),
                reason: format!("Must be an http(s) URL, got {:?}", self.api_base_url),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "API_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.session.window.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SESSION_WINDOW_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.session.tick.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SESSION_TICK_MILLIS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.session.tick > self.session.window {
            return Err(ConfigError::Invalid {
                var: "SESSION_TICK_MILLIS".to_string(),
                reason: format!(
                    "Must not exceed the session window ({}s)",
                    self.session.window.as_secs()
                ),
            });
        }

        if self.cache_gc_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "CACHE_GC_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
