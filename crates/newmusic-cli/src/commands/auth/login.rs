//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use newmusic_core::{ApiUrl, Credentials};

use crate::commands::report;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account e-mail
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "NEWMUSIC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Keep the session in memory only instead of saving it
    #[arg(long)]
    pub no_remember: bool,
}

pub async fn run(args: LoginArgs, api: ApiUrl) -> Result<()> {
    let session = CliSession::open(api)?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let response = session
        .factory
        .auth()
        .login(&credentials)
        .await
        .map_err(|e| report(e, "Failed to login"))?;

    let user = session
        .store
        .login(response, !args.no_remember)
        .context("Failed to save session")?;

    output::success("Logged in successfully");
    println!();
    output::field("Nome", &user.nome);
    output::field("E-mail", &user.email);
    output::field("Perfil", user.perfil.as_str());
    if args.no_remember {
        output::field("Session", "not saved");
    }

    Ok(())
}
