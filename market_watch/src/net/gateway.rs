//! Authenticated JSON gateway.

use super::{
    errors::ApiError,
    navigator::{LogoutReason, Navigator},
};
use crate::auth::CredentialStore;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use uuid::Uuid;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the login endpoint; a 401 from it is a failed login, not an expired session
pub const LOGIN_PATH: &str = "/auth/login";

/// Header carrying a per-request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Single outbound pipeline to the backend.
///
/// Attaches `Authorization: Bearer <token>` when a token is stored. A 401
/// on any request other than the login call clears the credential store
/// and navigates to the application root before the error is returned.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
}

impl HttpGateway {
    /// Create a gateway
    ///
    /// # Arguments
    ///
    /// * `base_url` - REST base URL, e.g. `http://localhost:8080/api`
    /// * `timeout` - Per-request timeout
    /// * `credentials` - Source of the bearer token
    /// * `navigator` - Invoked on an unexpected 401
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: CredentialStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            timeout,
            credentials,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET and decode a JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, |req| req).await
    }

    /// GET with query-string parameters
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |req| req.query(query)).await
    }

    /// POST a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |req| req.json(body)).await
    }

    /// PUT a JSON body
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, |req| req.json(body)).await
    }

    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        let request = build(request);

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(&e, self.timeout);
                log::warn!(
                    "{} {} failed after {}ms [{}]: {}",
                    method,
                    path,
                    start.elapsed().as_millis(),
                    request_id,
                    err
                );
                return Err(err);
            }
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e, self.timeout))?;

        log::debug!(
            "{} {} -> {} in {}ms [{}]",
            method,
            path,
            status.as_u16(),
            start.elapsed().as_millis(),
            request_id
        );

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| ApiError::parse(&e));
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path).await;
        }

        Err(ApiError::from_response(status, &body))
    }

    async fn handle_unauthorized(&self, path: &str) {
        if is_login_request(path) {
            log::debug!("Login rejected; keeping client state");
            return;
        }

        log::warn!("Unauthorized response for {}; ending session", path);
        if let Err(e) = self.credentials.clear() {
            log::error!("Failed to clear credentials after 401: {}", e);
        }
        self.navigator
            .navigate_to_root(LogoutReason::Unauthorized)
            .await;
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Whether the request path targets the login endpoint
pub fn is_login_request(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_end_matches('/').ends_with(LOGIN_PATH)
}

/// `prefix` followed by `segment` as one percent-encoded path segment
///
/// # Errors
///
/// Returns error if the path cannot be assembled
pub fn segment_path(prefix: &str, segment: &str) -> Result<String, ApiError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ApiError::unknown(format!("Failed to build request path: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::unknown("Failed to build request path"))?
        .clear()
        .extend(prefix.split('/').filter(|part| !part.is_empty()))
        .push(segment);
    Ok(url.path().to_string())
}
