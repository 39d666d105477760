//! Wiring between the session store and the API client.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};

use newmusic_client::{ClientConfig, ClientFactory};
use newmusic_core::{ApiUrl, CredentialHolder};
use newmusic_session::AuthStore;

use crate::output;

/// The persisted session plus a client factory that reads from it.
pub struct CliSession {
    pub store: AuthStore,
    pub factory: ClientFactory,
}

impl CliSession {
    /// Open the session store and install it as the factory's accessor.
    pub fn open(api: ApiUrl) -> Result<Self> {
        let dir = storage::session_dir()?;
        let store = AuthStore::open(&dir).context("Failed to load session")?;

        let factory = ClientFactory::new(ClientConfig::new(api))
            .context("Failed to build HTTP client")?
            .with_fatal_handler(|login_path: &str| {
                tracing::debug!(login_path, "Session could not be renewed");
                output::error("Session expired. Run 'newmusic auth login' to sign in again.");
            });
        factory.configure_auth_accessor(Arc::new(store.clone()));

        Ok(Self { store, factory })
    }

    /// Fail early with a login hint when there is no token to send.
    ///
    /// A restored session without the user record still authenticates.
    pub fn require_token(&self) -> Result<()> {
        if self.store.access_token().is_some() {
            Ok(())
        } else {
            anyhow::bail!("No active session. Run 'newmusic auth login' first.")
        }
    }
}
