//! Forgot-password command implementation.

use anyhow::Result;
use clap::Args;

use newmusic_core::ApiUrl;

use crate::commands::report;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    /// E-mail of the account to recover
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: ForgotPasswordArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;

    let message = session
        .factory
        .auth()
        .forgot_password(&args.email)
        .await
        .map_err(|e| report(e, "Failed to request password reset"))?;

    output::success(&message);
    Ok(())
}
