//! Credential holder contract.
//!
//! The HTTP client never stores tokens. It reads them from a
//! [`CredentialHolder`] supplied by the owning application, and reports
//! renewals or terminal failures back through optional capabilities.

use crate::tokens::{AccessToken, RefreshToken};
use crate::Result;

/// Source of the current session tokens.
///
/// `access_token` and `refresh_token` are read on every request, so
/// implementations must return the latest values. The capability methods
/// return `None` when the holder cannot persist renewed tokens or cannot
/// sign the user out; the client then skips that step.
pub trait CredentialHolder: Send + Sync {
    /// The current access token, if signed in.
    fn access_token(&self) -> Option<AccessToken>;

    /// The current refresh token, if any.
    fn refresh_token(&self) -> Option<RefreshToken>;

    /// Capability to receive renewed tokens.
    fn token_updater(&self) -> Option<&dyn TokenUpdater> {
        None
    }

    /// Capability to end the session.
    fn session_terminator(&self) -> Option<&dyn SessionTerminator> {
        None
    }
}

/// Receives the token pair issued by the renewal endpoint.
pub trait TokenUpdater: Send + Sync {
    /// Replace the stored tokens. Errors propagate to the caller of the
    /// request that triggered the renewal.
    fn update_tokens(&self, access: AccessToken, refresh: RefreshToken) -> Result<()>;
}

/// Ends the session after a failed renewal.
pub trait SessionTerminator: Send + Sync {
    /// Clear all session state.
    fn logout(&self) -> Result<()>;
}

/// Invoked when the session cannot be renewed and the user must sign in again.
///
/// Closures taking the login entry path implement this trait.
pub trait FatalAuthHandler: Send + Sync {
    /// `login_path` is the application's login entry point.
    fn on_fatal_auth_failure(&self, login_path: &str);
}

impl<F> FatalAuthHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_fatal_auth_failure(&self, login_path: &str) {
        self(login_path)
    }
}

/// A fixed pair of tokens with no capabilities.
///
/// Useful for scripts and tests that hold a token obtained elsewhere.
#[derive(Debug, Clone, Default)]
pub struct TokenSnapshot {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
}

impl TokenSnapshot {
    /// Create a snapshot from optional tokens.
    pub fn new(access_token: Option<AccessToken>, refresh_token: Option<RefreshToken>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    /// A snapshot with no tokens at all.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialHolder for TokenSnapshot {
    fn access_token(&self) -> Option<AccessToken> {
        self.access_token.clone()
    }

    fn refresh_token(&self) -> Option<RefreshToken> {
        self.refresh_token.clone()
    }
}
