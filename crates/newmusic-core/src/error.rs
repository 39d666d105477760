//! Error types for the New Music client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, input validation and storage errors.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::model::ApiErrorBody;

/// Message shown when the backend did not explain a failure.
pub const DEFAULT_ERROR_MESSAGE: &str = "Erro ao processar. Tente novamente.";

/// The unified error type for client operations.
///
/// Callers match on the variant to decide between retrying, showing a
/// validation message or sending the user back to the login screen.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed body).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (bad credentials, rejected refresh).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-2xx responses from the backend.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (base URL, header values, request body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Session persistence errors raised by the credential holder.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns the HTTP status if this error came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }

    /// Check if this is a 401 response from the backend.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api(err) if err.is_unauthorized())
    }

    /// Returns the API error details, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// E-mail or password rejected at login.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// No refresh token is available to renew the session.
    #[error("no refresh token available")]
    RefreshTokenMissing,

    /// The renewal endpoint rejected the refresh token.
    #[error("refresh rejected with HTTP {status}")]
    RefreshRejected { status: u16 },
}

/// A non-2xx response from the backend.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Parsed error body (empty when the backend sent none).
    pub body: ApiErrorBody,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, body: ApiErrorBody) -> Self {
        Self { status, body }
    }

    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// The backend message, or a generic one when absent.
    pub fn message(&self) -> &str {
        self.body.mensagem.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    /// Per-field validation messages.
    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.body.erros
    }

    /// Validation message for a single field.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.body.erros.get(field).map(String::as_str)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref mensagem) = self.body.mensagem {
            write!(f, ": {}", mensagem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A header value could not be built (e.g. control characters in a token).
    #[error("invalid header value: {reason}")]
    Header { reason: String },

    /// The request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Session storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the session file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The stored session could not be encoded or decoded.
    #[error("corrupt session data: {message}")]
    Encoding { message: String },
}
