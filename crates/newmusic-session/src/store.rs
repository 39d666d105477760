//! The credential holder owned by the application.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use newmusic_core::error::StorageError;
use newmusic_core::{
    AccessToken, AuthUser, CredentialHolder, Error, LoginResponse, Perfil, RefreshToken, Result,
    SessionTerminator, TokenUpdater,
};

use crate::file::{SessionFile, StoredSession};

/// Signed-in user and tokens, optionally backed by a session file.
///
/// Clone is cheap; clones share state. Install it into the client with
/// `factory.configure_auth_accessor(Arc::new(store.clone()))`.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    file: Option<SessionFile>,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    user: Option<AuthUser>,
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    remembered: bool,
}

impl AuthStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_state(None, StoreState::default())
    }

    /// Open the store in `dir`, restoring a remembered session if one exists.
    ///
    /// A session file missing either token, or one that does not parse,
    /// leaves the store signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but cannot be read.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let file = SessionFile::in_dir(dir.as_ref());

        let state = match file.load() {
            Ok(Some(stored)) => restore(stored),
            Ok(None) => StoreState::default(),
            Err(Error::Storage(StorageError::Encoding { message })) => {
                warn!(error = %message, "Ignoring unreadable session file");
                StoreState::default()
            }
            Err(err) => return Err(err),
        };

        debug!(authenticated = state.user.is_some(), "Session store opened");
        Ok(Self::with_state(Some(file), state))
    }

    fn with_state(file: Option<SessionFile>, state: StoreState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                file,
                state: RwLock::new(state),
            }),
        }
    }

    /// Start a session from a login response.
    ///
    /// With `remember`, the session is written to the session file; without
    /// it, any previously remembered session file is removed.
    #[instrument(skip(self, response), fields(email = %response.email))]
    pub fn login(&self, response: LoginResponse, remember: bool) -> Result<AuthUser> {
        let (user, tokens) = response.into_parts();
        let remember = remember && self.inner.file.is_some();
        let mut state = self.write();

        if let Some(file) = &self.inner.file {
            if remember {
                file.save(&StoredSession {
                    access_token: tokens.access_token.as_str().to_string(),
                    refresh_token: tokens.refresh_token.as_str().to_string(),
                    user: Some(user.clone()),
                    saved_at: Utc::now(),
                })?;
            } else {
                file.remove()?;
            }
        }

        *state = StoreState {
            user: Some(user.clone()),
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            remembered: remember,
        };

        info!(perfil = %user.perfil, remember, "Signed in");
        Ok(user)
    }

    /// Replace the token pair, keeping the user. A remembered session is
    /// rewritten on disk.
    pub fn update_tokens(&self, access: AccessToken, refresh: RefreshToken) -> Result<()> {
        let mut state = self.write();

        if state.remembered {
            if let Some(file) = &self.inner.file {
                file.save(&StoredSession {
                    access_token: access.as_str().to_string(),
                    refresh_token: refresh.as_str().to_string(),
                    user: state.user.clone(),
                    saved_at: Utc::now(),
                })?;
            }
        }

        state.access_token = Some(access);
        state.refresh_token = Some(refresh);
        debug!("Session tokens updated");
        Ok(())
    }

    /// Clear the session and delete the session file.
    pub fn logout(&self) -> Result<()> {
        let mut state = self.write();
        *state = StoreState::default();

        if let Some(file) = &self.inner.file {
            file.remove()?;
        }

        info!("Signed out");
        Ok(())
    }

    /// The signed-in user.
    pub fn user(&self) -> Option<AuthUser> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    /// Whether the session is persisted across runs.
    pub fn is_remembered(&self) -> bool {
        self.read().remembered
    }

    /// Whether the signed-in user has one of the `allowed` roles.
    pub fn has_any_role(&self, allowed: &[Perfil]) -> bool {
        self.read()
            .user
            .as_ref()
            .is_some_and(|user| user.has_any_role(allowed))
    }

    /// Location of the session file, for stores opened on a directory.
    pub fn session_path(&self) -> Option<&Path> {
        self.inner.file.as_ref().map(SessionFile::path)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Both tokens are required; a half-written session counts as signed out.
fn restore(stored: StoredSession) -> StoreState {
    if stored.access_token.is_empty() || stored.refresh_token.is_empty() {
        return StoreState::default();
    }
    StoreState {
        user: stored.user,
        access_token: Some(AccessToken::new(stored.access_token)),
        refresh_token: Some(RefreshToken::new(stored.refresh_token)),
        remembered: true,
    }
}

impl CredentialHolder for AuthStore {
    fn access_token(&self) -> Option<AccessToken> {
        self.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<RefreshToken> {
        self.read().refresh_token.clone()
    }

    fn token_updater(&self) -> Option<&dyn TokenUpdater> {
        Some(self)
    }

    fn session_terminator(&self) -> Option<&dyn SessionTerminator> {
        Some(self)
    }
}

impl TokenUpdater for AuthStore {
    fn update_tokens(&self, access: AccessToken, refresh: RefreshToken) -> Result<()> {
        AuthStore::update_tokens(self, access, refresh)
    }
}

impl SessionTerminator for AuthStore {
    fn logout(&self) -> Result<()> {
        AuthStore::logout(self)
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("AuthStore")
            .field("user", &state.user)
            .field("remembered", &state.remembered)
            .field("path", &self.session_path())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
