//! GET command implementation.

use anyhow::Result;
use clap::Args;

use newmusic_client::ApiRequest;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path under the API base, e.g. `alunos`
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long, short, value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,
}

pub fn request(args: GetArgs) -> ApiRequest {
    args.query
        .into_iter()
        .fold(ApiRequest::get(args.path), |request, (key, value)| {
            request.query(key, value)
        })
}

fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        anyhow::bail!("query key must not be empty");
    }
    Ok((key.to_string(), value.to_string()))
}
