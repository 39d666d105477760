//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use newmusic_core::ApiUrl;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;
    let was_signed_in = session.store.is_authenticated();

    session.store.logout().context("Failed to clear session")?;

    if was_signed_in {
        output::success("Logged out");
    } else {
        output::success("No active session");
    }
    Ok(())
}
