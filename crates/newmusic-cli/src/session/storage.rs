//! Location of the session file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Directory holding `session.json`, under the platform data dir.
pub fn session_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "newmusic").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
