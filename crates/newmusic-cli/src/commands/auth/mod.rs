//! Auth subcommand implementations.

mod forgot_password;
mod login;
mod logout;
mod refresh_token;
mod reset_password;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use newmusic_core::ApiUrl;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in with e-mail and password
    Login(login::LoginArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Renew the session tokens now
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Request a password reset e-mail
    ForgotPassword(forgot_password::ForgotPasswordArgs),

    /// Set a new password using a reset token
    ResetPassword(reset_password::ResetPasswordArgs),
}

pub async fn handle(cmd: AuthCommand, api: ApiUrl) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, api).await,
        AuthSubcommand::Logout(args) => logout::run(args, api),
        AuthSubcommand::Whoami(args) => whoami::run(args, api),
        AuthSubcommand::RefreshToken(args) => refresh_token::run(args, api).await,
        AuthSubcommand::ForgotPassword(args) => forgot_password::run(args, api).await,
        AuthSubcommand::ResetPassword(args) => reset_password::run(args, api).await,
    }
}
