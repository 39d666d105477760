//! newmusic-client - Authenticated HTTP client for the New Music API.
//!
//! All calls go through an [`ApiClient`] obtained from a [`ClientFactory`].
//! The client injects the bearer token read from the installed
//! [`CredentialHolder`](newmusic_core::CredentialHolder) and, when the
//! backend answers 401, renews the session once and replays the request.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use newmusic_client::{ClientConfig, ClientFactory};
//! use newmusic_core::{AccessToken, ApiUrl, RefreshToken, TokenSnapshot};
//!
//! # async fn example() -> Result<(), newmusic_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://escola.example/api")?);
//! let factory = ClientFactory::new(config)?
//!     .with_fatal_handler(|login_path: &str| eprintln!("sign in again at {login_path}"));
//!
//! factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
//!     Some(AccessToken::new("access")),
//!     Some(RefreshToken::new("refresh")),
//! )));
//!
//! let alunos: serde_json::Value = factory.client()?.get_json("alunos").await?;
//! println!("{alunos}");
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod client;
mod factory;
mod http;

pub use api::{ApiRequest, ApiResponse};
pub use auth::AuthApi;
pub use client::{ApiClient, LOGIN_ENTRY_PATH};
pub use factory::{ClientConfig, ClientFactory};
