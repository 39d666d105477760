//! Request/response types and endpoint definitions.

mod endpoints;
mod request;

pub(crate) use endpoints::*;
pub use request::{ApiRequest, ApiResponse};
