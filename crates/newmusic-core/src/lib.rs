//! newmusic-core - Core types and traits for the New Music API client.
//!
//! This crate holds everything the HTTP client, the session store and the
//! CLI agree on: validated base URLs, redacting token types, the
//! credential-holder contract and the unified [`Error`] type.

pub mod credentials;
pub mod error;
pub mod model;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use model::{ApiErrorBody, AuthUser, LoginResponse, Perfil, TokenPair};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{
    CredentialHolder, FatalAuthHandler, SessionTerminator, TokenSnapshot, TokenUpdater,
};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
