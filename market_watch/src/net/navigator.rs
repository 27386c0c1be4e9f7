//! Navigation seam.
//!
//! A forced logout ends with "navigate to the application root". In a
//! browser that is a full reload; here it drops every cached query and
//! tells subscribers (the UI layer) to show the entry screen.

use crate::query::QueryClient;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out
    UserLogout,
    /// A request outside the login call was rejected with 401
    Unauthorized,
    /// The session countdown reached zero
    SessionExpired,
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UserLogout => "user logout",
            Self::Unauthorized => "unauthorized response",
            Self::SessionExpired => "session expired",
        };
        f.write_str(text)
    }
}

/// Navigation event published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Back to the application root
    Root { reason: LogoutReason },
}

#[async_trait]
pub trait Navigator: Send + Sync {
    /// Reset client state and return to the application root
    async fn navigate_to_root(&self, reason: LogoutReason);
}

/// Default navigator: clears the query cache, then broadcasts [`Navigation::Root`].
#[derive(Clone)]
pub struct RootNavigator {
    cache: QueryClient,
    events: broadcast::Sender<Navigation>,
}

impl RootNavigator {
    pub fn new(cache: QueryClient, events: broadcast::Sender<Navigation>) -> Self {
        Self { cache, events }
    }

    /// Receive navigation events
    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.events.subscribe()
    }
}

#[async_trait]
impl Navigator for RootNavigator {
    async fn navigate_to_root(&self, reason: LogoutReason) {
        self.cache.invalidate_all().await;
        log::info!("Navigating to root ({})", reason);
        // No subscribers is fine: nothing is showing a screen.
        let _ = self.events.send(Navigation::Root { reason });
    }
}
