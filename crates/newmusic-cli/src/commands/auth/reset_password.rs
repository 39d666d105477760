//! Reset-password command implementation.

use anyhow::Result;
use clap::Args;

use newmusic_core::ApiUrl;

use crate::commands::report;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Token from the reset e-mail
    #[arg(long)]
    pub token: String,

    /// The new password
    #[arg(long)]
    pub new_password: String,
}

pub async fn run(args: ResetPasswordArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;

    let message = session
        .factory
        .auth()
        .reset_password(&args.token, &args.new_password)
        .await
        .map_err(|e| report(e, "Failed to reset password"))?;

    output::success(&message);
    Ok(())
}
