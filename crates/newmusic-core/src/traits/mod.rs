//! Contracts between the HTTP client and the application that owns the session.

mod holder;

pub use holder::{
    CredentialHolder, FatalAuthHandler, SessionTerminator, TokenSnapshot, TokenUpdater,
};
