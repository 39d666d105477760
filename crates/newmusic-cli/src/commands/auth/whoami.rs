//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use newmusic_core::ApiUrl;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;
    let user = session
        .store
        .user()
        .context("No active session. Run 'newmusic auth login' first.")?;

    output::field("ID", &user.id.to_string());
    output::field("Nome", &user.nome);
    output::field("E-mail", &user.email);
    output::field("Perfil", user.perfil.as_str());
    if let Some(professor_id) = user.professor_id {
        output::field("Professor ID", &professor_id.to_string());
    }
    if let Some(path) = session.store.session_path() {
        output::field("Session file", &path.display().to_string());
    }

    Ok(())
}
