//! On-disk session file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use newmusic_core::error::StorageError;
use newmusic_core::{AuthUser, Error, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the session file inside the store directory.
pub const SESSION_FILE: &str = "session.json";

fn map_io(path: &Path) -> impl Fn(io::Error) -> Error + '_ {
    move |err| {
        Error::Storage(StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Persisted session contents.
#[derive(Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
    pub saved_at: DateTime<Utc>,
}

/// The session file and its sibling lock file.
#[derive(Debug, Clone)]
pub(crate) struct SessionFile {
    path: PathBuf,
    lock_path: PathBuf,
}

impl SessionFile {
    pub fn in_dir(dir: &Path) -> Self {
        let path = dir.join(SESSION_FILE);
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if the file exists.
    ///
    /// A file that does not parse is reported as [`StorageError::Encoding`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(map_io(&self.lock_path))?;

        let json = fs::read_to_string(&self.path);
        lock.unlock().map_err(map_io(&self.lock_path))?;

        let json = json.map_err(map_io(&self.path))?;
        let stored = serde_json::from_str(&json).map_err(|e| {
            Error::Storage(StorageError::Encoding {
                message: e.to_string(),
            })
        })?;

        debug!("Session file loaded");
        Ok(Some(stored))
    }

    /// Write the session, readable by the owner only.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, stored: &StoredSession) -> Result<()> {
        let json = serde_json::to_string_pretty(stored).map_err(|e| {
            Error::Storage(StorageError::Encoding {
                message: e.to_string(),
            })
        })?;

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_io(&self.lock_path))?;

        let written = self.write_locked(&json);
        lock.unlock().map_err(map_io(&self.lock_path))?;
        written?;

        debug!("Session file written");
        Ok(())
    }

    /// Delete the session file if present.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn remove(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_io(&self.lock_path))?;

        let removed = match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(map_io(&self.path)(err)),
            _ => Ok(()),
        };
        lock.unlock().map_err(map_io(&self.lock_path))?;
        removed?;

        debug!("Session file removed");
        Ok(())
    }

    fn write_locked(&self, json: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(map_io(&self.path))?;

        file.write_all(json.as_bytes())
            .map_err(map_io(&self.path))?;
        file.sync_data().map_err(map_io(&self.path))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)
                .map_err(map_io(&self.path))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(map_io(&self.path))?;
        }

        Ok(())
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent).map_err(map_io(parent))?;
        }
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(map_io(&self.lock_path))
    }
}
