//! Credential store: the bearer token and the user profile, kept together.

use super::{
    models::{Credentials, UserProfile},
    store::{KeyValueStore, StoreResult},
};
use std::sync::Arc;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key of the serialized user profile
pub const USER_KEY: &str = "user";

/// Typed view over a [`KeyValueStore`].
///
/// Reads fail soft: a missing key, a store error or an unparseable profile
/// all read as "absent". Failures are logged, never returned.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist token and user in a single store write
    ///
    /// # Errors
    ///
    /// Returns error if the profile cannot be serialized or the store write fails
    pub fn set_credentials(&self, user: &UserProfile, token: &str) -> StoreResult<()> {
        let user_json = serde_json::to_string(user)?;
        self.store
            .set_many(&[(TOKEN_KEY, token.to_string()), (USER_KEY, user_json)])?;
        log::info!("Stored credentials for user {}", user.username);
        Ok(())
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::error!("Failed to read auth token: {}", e);
                None
            }
        }
    }

    /// Current user profile, if any
    pub fn user(&self) -> Option<UserProfile> {
        let raw = match self.store.get(USER_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                log::error!("Failed to read user profile: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::error!("Failed to parse stored user profile: {}", e);
                None
            }
        }
    }

    /// Token and user together, when both are present
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            token: self.token()?,
            user: self.user()?,
        })
    }

    /// True iff both token and user are present
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user().is_some()
    }

    /// Remove token and user
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove_many(&[TOKEN_KEY, USER_KEY])
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
