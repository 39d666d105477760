//! CLI argument definitions.

use clap::{Parser, Subcommand};

use newmusic_core::ApiUrl;

use crate::commands::api::ApiCommand;
use crate::commands::auth::AuthCommand;

/// Command-line client for the New Music back office.
#[derive(Parser, Debug)]
#[command(name = "newmusic")]
#[command(author, version = env!("NEWMUSIC_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Base URL of the REST API
    #[arg(
        long,
        global = true,
        env = "NEWMUSIC_API",
        default_value = "http://localhost:8080/api"
    )]
    pub api: ApiUrl,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and manage passwords
    Auth(AuthCommand),

    /// Authenticated requests against the API
    Api(ApiCommand),
}
