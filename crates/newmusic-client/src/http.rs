//! reqwest plumbing shared by the authenticated client and the auth endpoints.

use reqwest::header::HeaderValue;
use tracing::trace;

use newmusic_core::error::{ApiError, InvalidInputError, TransportError};
use newmusic_core::{AccessToken, ApiErrorBody, Error, Result};

use crate::api::ApiResponse;
use crate::factory::ClientConfig;

/// Build a reqwest client from the configuration.
pub(crate) fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(transport_error)
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// `Authorization` header value for a token, marked sensitive.
pub(crate) fn bearer_header(token: &AccessToken) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&token.bearer()).map_err(|e| InvalidInputError::Header {
        reason: e.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Read a response: 2xx becomes an [`ApiResponse`], anything else an [`ApiError`].
pub(crate) async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    trace!(status = %status, "API response");

    if status.is_success() {
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(ApiResponse::new(status, headers, body.to_vec()))
    } else {
        Err(Error::Api(parse_error_response(response).await))
    }
}

/// Parse the backend's `{ mensagem, erros }` error body, tolerating anything else.
pub(crate) async fn parse_error_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();

    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_default(),
        Err(_) => ApiErrorBody::default(),
    };

    ApiError::new(status, body)
}
