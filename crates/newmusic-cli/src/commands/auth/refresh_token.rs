//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use newmusic_core::{ApiUrl, CredentialHolder};

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;
    let refresh_token = session
        .store
        .refresh_token()
        .context("No active session. Run 'newmusic auth login' first.")?;

    eprintln!("{}", "Refreshing session...".dimmed());

    let tokens = match session.factory.auth().refresh(&refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) => {
            session.store.logout().context("Failed to clear session")?;
            return Err(anyhow::Error::new(e)
                .context("Failed to refresh session. Run 'newmusic auth login' again."));
        }
    };

    session
        .store
        .update_tokens(tokens.access_token, tokens.refresh_token)
        .context("Failed to save refreshed session")?;

    output::success("Session refreshed successfully");
    Ok(())
}
