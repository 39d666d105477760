//! DELETE command implementation.

use clap::Args;

use newmusic_client::ApiRequest;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Path under the API base, e.g. `alunos/7`
    pub path: String,
}

pub fn request(args: DeleteArgs) -> ApiRequest {
    ApiRequest::delete(args.path)
}
