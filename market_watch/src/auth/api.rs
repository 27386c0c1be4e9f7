//! Typed calls for the `/auth` and `/users` endpoints.

use super::models::{
    ApiResponse, AvailabilityResponse, ChangePasswordRequest, LoginRequest, LoginResponse,
    SignUpRequest, SignUpResponse, UserId, UserListResponse, UserProfile, UserResponse,
};
use crate::net::{
    errors::{ApiError, ErrorCode},
    gateway::{HttpGateway, LOGIN_PATH, segment_path},
};
use std::sync::Arc;

/// Authentication and user endpoints
#[derive(Debug, Clone)]
pub struct AuthApi {
    gateway: Arc<HttpGateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// Exchange username and password for a token
    ///
    /// # Errors
    ///
    /// Returns the normalized error, or `LOGIN_ERROR` if the backend
    /// answers 2xx without both a user and a token
    pub async fn login(&self, request: &LoginRequest) -> Result<(UserProfile, String), ApiError> {
        let response: LoginResponse = self.gateway.post(LOGIN_PATH, request).await?;
        match (response.success, response.user, response.token) {
            (true, Some(user), Some(token)) => Ok((user, token)),
            _ => Err(rejected("LOGIN_ERROR", response.message, "Login failed")),
        }
    }

    /// Register a new account
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<UserProfile, ApiError> {
        let response: SignUpResponse = self.gateway.post("/auth/signup", request).await?;
        match (response.success, response.user) {
            (true, Some(user)) => Ok(user),
            _ => Err(rejected("SIGNUP_ERROR", response.message, "Sign-up failed")),
        }
    }

    /// Whether a username is still free
    pub async fn check_username(&self, username: &str) -> Result<AvailabilityResponse, ApiError> {
        let path = segment_path("/auth/check-username", username)?;
        self.gateway.get(&path).await
    }

    /// Whether an email address is still free
    pub async fn check_email(&self, email: &str) -> Result<AvailabilityResponse, ApiError> {
        let path = segment_path("/auth/check-email", email)?;
        self.gateway.get(&path).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserProfile, ApiError> {
        let response: UserResponse = self.gateway.get(&format!("/users/{id}")).await?;
        match response.user {
            Some(user) if response.success => Ok(user),
            _ => Err(rejected("USER_NOT_FOUND", String::new(), "User not found")),
        }
    }

    pub async fn get_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        let response: UserListResponse = self.gateway.get("/users").await?;
        Ok(response.users)
    }

    /// Change the password of `id`
    pub async fn change_password(
        &self,
        id: UserId,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let response: ApiResponse<serde_json::Value> = self
            .gateway
            .put(&format!("/users/{id}/password"), request)
            .await?;
        if response.success {
            Ok(())
        } else {
            Err(rejected(
                "PASSWORD_CHANGE_ERROR",
                response.message,
                "Password change failed",
            ))
        }
    }
}

/// A 2xx response whose envelope reports failure
fn rejected(code: &str, message: String, fallback: &str) -> ApiError {
    let message = if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    };
    ApiError::new(ErrorCode::from(code.to_string()), message)
}
