//! Shared helpers for the client integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use newmusic_client::{ClientConfig, ClientFactory};
use newmusic_core::error::StorageError;
use newmusic_core::{
    AccessToken, ApiUrl, CredentialHolder, Error, RefreshToken, Result, SessionTerminator,
    TokenUpdater,
};
use wiremock::MockServer;

/// API base URL pointing at the mock server.
pub fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("{}/api", server.uri())).unwrap()
}

/// Factory for the mock server with no accessor installed.
pub fn factory_for(server: &MockServer) -> ClientFactory {
    ClientFactory::new(ClientConfig::new(mock_api_url(server))).unwrap()
}

/// Factory whose fatal handler records the paths it was called with.
pub fn factory_with_fatal_log(server: &MockServer) -> (ClientFactory, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let factory = factory_for(server)
        .with_fatal_handler(move |path: &str| log.lock().unwrap().push(path.to_string()));
    (factory, seen)
}

/// Credential holder with both capabilities that records every callback.
#[derive(Default)]
pub struct RecordingHolder {
    tokens: Mutex<(Option<String>, Option<String>)>,
    pub updates: Mutex<Vec<(String, String)>>,
    pub logouts: AtomicUsize,
    fail_logout: bool,
    fail_update: bool,
}

impl RecordingHolder {
    pub fn new(access: Option<&str>, refresh: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new((access.map(String::from), refresh.map(String::from))),
            ..Self::default()
        })
    }

    pub fn failing_logout(access: &str, refresh: &str) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new((Some(access.to_string()), Some(refresh.to_string()))),
            fail_logout: true,
            ..Self::default()
        })
    }

    pub fn failing_update(access: &str, refresh: &str) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new((Some(access.to_string()), Some(refresh.to_string()))),
            fail_update: true,
            ..Self::default()
        })
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn current_access(&self) -> Option<String> {
        self.tokens.lock().unwrap().0.clone()
    }
}

impl CredentialHolder for RecordingHolder {
    fn access_token(&self) -> Option<AccessToken> {
        self.tokens.lock().unwrap().0.clone().map(AccessToken::new)
    }

    fn refresh_token(&self) -> Option<RefreshToken> {
        self.tokens.lock().unwrap().1.clone().map(RefreshToken::new)
    }

    fn token_updater(&self) -> Option<&dyn TokenUpdater> {
        Some(self)
    }

    fn session_terminator(&self) -> Option<&dyn SessionTerminator> {
        Some(self)
    }
}

impl TokenUpdater for RecordingHolder {
    fn update_tokens(&self, access: AccessToken, refresh: RefreshToken) -> Result<()> {
        if self.fail_update {
            return Err(Error::Storage(StorageError::Io {
                path: "session.json".to_string(),
                message: "read-only file system".to_string(),
            }));
        }
        self.updates
            .lock()
            .unwrap()
            .push((access.as_str().to_string(), refresh.as_str().to_string()));
        *self.tokens.lock().unwrap() = (
            Some(access.as_str().to_string()),
            Some(refresh.as_str().to_string()),
        );
        Ok(())
    }
}

impl SessionTerminator for RecordingHolder {
    fn logout(&self) -> Result<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(Error::Storage(StorageError::Io {
                path: "session.json".to_string(),
                message: "read-only file system".to_string(),
            }));
        }
        *self.tokens.lock().unwrap() = (None, None);
        Ok(())
    }
}
