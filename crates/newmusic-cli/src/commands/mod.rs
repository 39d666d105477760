//! Subcommand implementations.

pub mod api;
pub mod auth;

use newmusic_core::Error;

use crate::output;

/// Turn a library error into a CLI error, printing backend validation
/// messages on the way.
pub fn report(err: Error, action: &'static str) -> anyhow::Error {
    if let Some(api) = err.as_api() {
        output::api_error(api);
    }
    anyhow::Error::new(err).context(action)
}
