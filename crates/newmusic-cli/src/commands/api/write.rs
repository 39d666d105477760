//! POST and PUT command implementation.

use anyhow::{Context, Result};
use clap::Args;

use newmusic_client::ApiRequest;

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Path under the API base, e.g. `alunos/7`
    pub path: String,

    /// JSON request body
    #[arg(long, short)]
    pub data: String,
}

pub fn request(request: ApiRequest, args: &WriteArgs) -> Result<ApiRequest> {
    let body: serde_json::Value =
        serde_json::from_str(&args.data).context("--data must be valid JSON")?;
    request.json(&body).context("Failed to encode request body")
}
