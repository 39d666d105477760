//! Client configuration and the memoizing factory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use newmusic_core::{ApiUrl, CredentialHolder, FatalAuthHandler, Result};

use crate::auth::AuthApi;
use crate::client::ApiClient;
use crate::http::build_http_client;

/// Settings shared by every client the factory builds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://escola.example/api`.
    pub base: ApiUrl,
    /// Per-request timeout. `None` keeps reqwest's default.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base: ApiUrl) -> Self {
        Self {
            base,
            timeout: None,
            user_agent: concat!("newmusic-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Owns the credential accessor and the lazily built [`ApiClient`].
///
/// Create one at application start and pass it to every caller.
/// [`configure_auth_accessor`](Self::configure_auth_accessor) and
/// [`invalidate`](Self::invalidate) start a new generation: the next
/// [`client`](Self::client) call builds a fresh instance bound to the
/// current accessor, and handles obtained earlier keep their old one.
pub struct ClientFactory {
    config: ClientConfig,
    auth: AuthApi,
    on_fatal: Option<Arc<dyn FatalAuthHandler>>,
    state: Mutex<FactoryState>,
}

#[derive(Default)]
struct FactoryState {
    holder: Option<Arc<dyn CredentialHolder>>,
    client: Option<ApiClient>,
    generation: u64,
}

impl ClientFactory {
    /// Create a factory with no accessor installed (requests go out anonymous).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let auth = AuthApi::new(&config)?;
        Ok(Self {
            config,
            auth,
            on_fatal: None,
            state: Mutex::new(FactoryState::default()),
        })
    }

    /// Set the callback run when a session cannot be renewed.
    pub fn with_fatal_handler(mut self, handler: impl FatalAuthHandler + 'static) -> Self {
        self.on_fatal = Some(Arc::new(handler));
        self
    }

    /// Install the credential holder read by every request.
    ///
    /// Any previously built client is dropped, even if the holder is the same.
    pub fn configure_auth_accessor(&self, holder: Arc<dyn CredentialHolder>) {
        let mut state = self.lock();
        state.holder = Some(holder);
        state.client = None;
        state.generation += 1;
        debug!(generation = state.generation, "Credential accessor installed");
    }

    /// Drop the memoized client without changing the accessor.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.client = None;
        state.generation += 1;
        debug!(generation = state.generation, "Client invalidated");
    }

    /// Returns the client for the current generation, building it on first use.
    pub fn client(&self) -> Result<ApiClient> {
        let mut state = self.lock();
        if let Some(client) = &state.client {
            return Ok(client.clone());
        }

        let client = ApiClient::new(
            build_http_client(&self.config)?,
            self.config.base.clone(),
            self.auth.clone(),
            state.holder.clone(),
            self.on_fatal.clone(),
            state.generation,
        );
        debug!(generation = state.generation, "API client built");

        state.client = Some(client.clone());
        Ok(client)
    }

    /// The anonymous auth endpoints (login, refresh, password reset).
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ClientFactory")
            .field("base", &self.config.base)
            .field("generation", &state.generation)
            .field("has_accessor", &state.holder.is_some())
            .field("has_client", &state.client.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newmusic_core::TokenSnapshot;

    fn factory() -> ClientFactory {
        let base = ApiUrl::new("http://localhost:8080/api").unwrap();
        ClientFactory::new(ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn client_is_memoized() {
        let factory = factory();
        let a = factory.client().unwrap();
        let b = factory.client().unwrap();
        assert!(ApiClient::ptr_eq(&a, &b));
    }

    #[test]
    fn configuring_accessor_rebuilds_client() {
        let factory = factory();
        factory.configure_auth_accessor(Arc::new(TokenSnapshot::anonymous()));
        let first = factory.client().unwrap();

        factory.configure_auth_accessor(Arc::new(TokenSnapshot::anonymous()));
        let second = factory.client().unwrap();

        assert!(!ApiClient::ptr_eq(&first, &second));
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn invalidate_rebuilds_client() {
        let factory = factory();
        let first = factory.client().unwrap();
        factory.invalidate();
        let second = factory.client().unwrap();
        assert!(!ApiClient::ptr_eq(&first, &second));
    }

    #[test]
    fn timeout_is_optional() {
        let base = ApiUrl::new("http://localhost:8080/api").unwrap();
        let config = ClientConfig::new(base).with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert!(ClientFactory::new(config).is_ok());
    }
}
