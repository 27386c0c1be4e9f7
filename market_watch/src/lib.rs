//! # Market Watch
//!
//! Client core for a financial monitoring dashboard: exchange rates,
//! interest rates, consumer price index and sales/commission tables served
//! by a REST backend.
//!
//! The crate owns two concerns a UI layer would otherwise re-implement:
//!
//! - **Session lifecycle**: credentials persisted in a key-value store, a
//!   bearer-token gateway that logs out on an unexpected 401, and a
//!   countdown that forces a logout once the session window elapses.
//! - **Query cache orchestration**: named, parameterized queries with
//!   freshness windows, retries, in-flight de-duplication, derived views
//!   and invalidation.
//!
//! ## Core Modules
//!
//! - [`auth`]: Credential store, input validation and auth endpoints
//! - [`net`]: HTTP gateway, error normalization and the navigation seam
//! - [`session`]: Expiry countdown state machine and its monitor task
//! - [`query`]: The query cache
//! - [`dashboard`]: Dashboard endpoints, cached queries and selectors
//! - [`client`]: [`DashboardClient`], which wires everything together
//!
//! ## Example
//!
//! ```no_run
//! use market_watch::{ClientConfig, DashboardClient, auth::LoginRequest, dashboard::DateRange};
//!
//! # async fn demo() -> Result<(), market_watch::ApiError> {
//! let client = DashboardClient::from_config(ClientConfig::default())?;
//! client
//!     .login(&LoginRequest {
//!         username: "analyst".to_string(),
//!         password: "secret123".to_string(),
//!     })
//!     .await?;
//!
//! let _monitor = client.start_session_monitor();
//! let data = client.dashboard().dashboard(&DateRange::default()).await;
//! assert!(!data.status().is_loading);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod net;
pub mod query;
pub mod session;

pub use client::DashboardClient;
pub use config::{ClientConfig, ConfigError, SessionConfig};
pub use net::{
    errors::{ApiError, ErrorCode},
    gateway::HttpGateway,
    navigator::{LogoutReason, Navigation, Navigator, RootNavigator},
};
pub use query::{QueryClient, QueryKey, QueryOptions, QueryState};
pub use session::{ExpiryAnchor, ExpiryInfo, SessionMonitor};
