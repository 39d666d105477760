//! Authenticated request subcommands.

mod delete;
mod get;
mod write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use newmusic_client::{ApiRequest, ApiResponse};
use newmusic_core::ApiUrl;

use crate::commands::report;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ApiCommand {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// GET a resource
    Get(get::GetArgs),

    /// POST a JSON body
    Post(write::WriteArgs),

    /// PUT a JSON body
    Put(write::WriteArgs),

    /// DELETE a resource
    Delete(delete::DeleteArgs),
}

pub async fn handle(cmd: ApiCommand, api: ApiUrl) -> Result<()> {
    let request = match cmd.command {
        ApiSubcommand::Get(args) => get::request(args),
        ApiSubcommand::Post(args) => write::request(ApiRequest::post(&args.path), &args)?,
        ApiSubcommand::Put(args) => write::request(ApiRequest::put(&args.path), &args)?,
        ApiSubcommand::Delete(args) => delete::request(args),
    };

    let session = CliSession::open(api)?;
    session.require_token()?;

    let client = session.factory.client().context("Failed to build client")?;
    let response = client
        .send(request)
        .await
        .map_err(|e| report(e, "Request failed"))?;

    print_response(&response)
}

/// Pretty-print a JSON body, or note that there was none.
fn print_response(response: &ApiResponse) -> Result<()> {
    let value: serde_json::Value = response
        .json()
        .context("Response body is not JSON")?;

    if value.is_null() {
        output::success(&format!("{} (no content)", response.status()));
        return Ok(());
    }
    output::json_pretty(&value)
}
