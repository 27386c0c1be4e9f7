//! Cached reads of the availability and user endpoints.

use super::{
    api::AuthApi,
    models::{AvailabilityResponse, UserId, UserProfile},
};
use crate::query::{QueryClient, QueryKey, QueryOptions, QueryState};

pub const USERNAME_AVAILABILITY: &str = "usernameAvailability";
pub const EMAIL_AVAILABILITY: &str = "emailAvailability";
pub const USER: &str = "user";

pub fn username_availability_key(username: &str) -> QueryKey {
    QueryKey::new(USERNAME_AVAILABILITY).with(username)
}

pub fn email_availability_key(email: &str) -> QueryKey {
    QueryKey::new(EMAIL_AVAILABILITY).with(email)
}

pub fn user_key(id: UserId) -> QueryKey {
    QueryKey::new(USER).with(id)
}

/// Auth lookups behind the query cache, using the short-lived auth preset
#[derive(Debug, Clone)]
pub struct AuthQueries {
    cache: QueryClient,
    api: AuthApi,
}

impl AuthQueries {
    pub fn new(cache: QueryClient, api: AuthApi) -> Self {
        Self { cache, api }
    }

    pub async fn username_availability(&self, username: &str) -> QueryState<AvailabilityResponse> {
        let api = self.api.clone();
        let owned = username.to_string();
        self.cache
            .query(
                &username_availability_key(username),
                QueryOptions::auth(),
                move || {
                    let api = api.clone();
                    let username = owned.clone();
                    async move { api.check_username(&username).await }
                },
            )
            .await
    }

    pub async fn email_availability(&self, email: &str) -> QueryState<AvailabilityResponse> {
        let api = self.api.clone();
        let owned = email.to_string();
        self.cache
            .query(&email_availability_key(email), QueryOptions::auth(), move || {
                let api = api.clone();
                let email = owned.clone();
                async move { api.check_email(&email).await }
            })
            .await
    }

    pub async fn user(&self, id: UserId) -> QueryState<UserProfile> {
        let api = self.api.clone();
        self.cache
            .query(&user_key(id), QueryOptions::auth(), move || {
                let api = api.clone();
                async move { api.get_user(id).await }
            })
            .await
    }

    /// Forget availability answers; a registration may have taken a name
    pub async fn invalidate_availability(&self) {
        self.cache.invalidate(USERNAME_AVAILABILITY).await;
        self.cache.invalidate(EMAIL_AVAILABILITY).await;
    }
}
