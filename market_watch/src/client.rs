//! Client context wiring the credential store, gateway, cache and session monitor.

use crate::{
    auth::{
        AuthApi, AuthQueries, CredentialStore, FileStore, KeyValueStore, LoginRequest,
        MemoryStore, SignUpRequest, UserProfile, validation,
    },
    config::ClientConfig,
    dashboard::{DashboardApi, DashboardQueries, RefreshCoordinator},
    net::{
        errors::{ApiError, ErrorCode},
        gateway::HttpGateway,
        navigator::{LogoutReason, Navigation, Navigator, RootNavigator},
    },
    query::{CacheCollector, QueryClient, RefetchTrigger},
    session::SessionMonitor,
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Capacity of the navigation event channel
const NAVIGATION_CAPACITY: usize = 16;

/// One dashboard session: everything a UI layer needs, owned explicitly.
///
/// Cloning is cheap; clones share the same cache, store and gateway.
#[derive(Clone)]
pub struct DashboardClient {
    config: ClientConfig,
    credentials: CredentialStore,
    cache: QueryClient,
    navigator: Arc<RootNavigator>,
    gateway: Arc<HttpGateway>,
    auth: AuthApi,
    auth_queries: AuthQueries,
    dashboard: DashboardQueries,
    refresh: RefreshCoordinator,
    logins: Arc<watch::Sender<u64>>,
    collector: Arc<CacheCollector>,
}

impl DashboardClient {
    /// Create a client over `store`
    ///
    /// Must be called inside a Tokio runtime: the client owns a background
    /// sweep that drops idle cache entries once their cache time passes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid `config`, or an error if
    /// there is no runtime or the HTTP client cannot be built
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::new(ErrorCode::ValidationError, e.to_string()))?;
        tokio::runtime::Handle::try_current()
            .map_err(|e| ApiError::unknown(format!("Client requires a Tokio runtime: {e}")))?;

        let credentials = CredentialStore::new(store);
        let cache = QueryClient::new();
        let (events, _) = broadcast::channel(NAVIGATION_CAPACITY);
        let navigator = Arc::new(RootNavigator::new(cache.clone(), events));
        let gateway = Arc::new(HttpGateway::new(
            config.api_base_url.clone(),
            config.request_timeout,
            credentials.clone(),
            navigator.clone(),
        )?);
        let (logins, _) = watch::channel(0);
        let auth = AuthApi::new(gateway.clone());

        Ok(Self {
            auth_queries: AuthQueries::new(cache.clone(), auth.clone()),
            auth,
            dashboard: DashboardQueries::new(cache.clone(), DashboardApi::new(gateway.clone())),
            refresh: RefreshCoordinator::new(cache.clone(), config.refresh_cooldown),
            logins: Arc::new(logins),
            collector: Arc::new(CacheCollector::spawn(cache.clone(), config.cache_gc_interval)),
            config,
            credentials,
            cache,
            navigator,
            gateway,
        })
    }

    /// Create a client whose store follows `config.credentials_path`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn KeyValueStore> = match &config.credentials_path {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(config, store)
    }

    /// Validate, authenticate and persist the session
    ///
    /// A successful login restarts the session countdown.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made, or the
    /// server's rejection
    pub async fn login(&self, request: &LoginRequest) -> Result<UserProfile, ApiError> {
        validation::validate_login(request)?;

        let (user, token) = self.auth.login(request).await?;
        self.credentials
            .set_credentials(&user, &token)
            .map_err(|e| ApiError::unknown(format!("Failed to store credentials: {e}")))?;
        self.logins.send_modify(|generation| *generation += 1);

        log::info!("Logged in as {}", user.username);
        Ok(user)
    }

    /// Validate and register a new account; does not log in
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made, or the
    /// server's rejection
    pub async fn sign_up(
        &self,
        request: &SignUpRequest,
        confirm_password: &str,
    ) -> Result<UserProfile, ApiError> {
        validation::validate_signup(request, confirm_password)?;
        let user = self.auth.sign_up(request).await?;
        self.auth_queries.invalidate_availability().await;
        log::info!("Registered {}", user.username);
        Ok(user)
    }

    /// Clear the session and return to the root
    pub async fn logout(&self) {
        if let Err(e) = self.credentials.clear() {
            log::error!("Failed to clear credentials on logout: {}", e);
        }
        self.navigator
            .navigate_to_root(LogoutReason::UserLogout)
            .await;
    }

    /// Start the session countdown; it stops when the returned handle drops
    pub fn start_session_monitor(&self) -> SessionMonitor {
        SessionMonitor::spawn(
            self.config.session,
            self.credentials.clone(),
            self.navigator.clone(),
            self.logins.subscribe(),
        )
    }

    /// Receive navigation events (forced and voluntary logouts)
    pub fn subscribe_navigation(&self) -> broadcast::Receiver<Navigation> {
        self.navigator.subscribe()
    }

    /// Forward an environment event to the cache
    pub async fn notify(&self, trigger: RefetchTrigger) -> usize {
        self.cache.notify(trigger).await
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.credentials.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub fn gateway(&self) -> &Arc<HttpGateway> {
        &self.gateway
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// Cached availability and user lookups
    pub fn auth_queries(&self) -> &AuthQueries {
        &self.auth_queries
    }

    pub fn dashboard(&self) -> &DashboardQueries {
        &self.dashboard
    }

    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("authenticated", &self.credentials.is_authenticated())
            .field("cache_sweep", &self.collector.is_running())
            .finish_non_exhaustive()
    }
}
