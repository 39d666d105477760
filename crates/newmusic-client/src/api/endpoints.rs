//! Auth endpoint paths and their wire types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths (relative to the API base URL)
// ============================================================================

/// POST, e-mail and password in, session out.
pub const LOGIN: &str = "auth/login";

/// POST, refresh token in, new token pair out.
pub const REFRESH: &str = "auth/refresh";

/// POST, sends a password reset link by e-mail.
pub const FORGOT_PASSWORD: &str = "auth/esqueci-senha";

/// POST, sets a new password using the e-mailed token.
pub const RESET_PASSWORD: &str = "auth/redefinir-senha";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub senha: &'a str,
}

/// Request body for refresh.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from refresh. The backend also echoes the user, which is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Request body for the forgot-password endpoint.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

/// Request body for the reset-password endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub nova_senha: &'a str,
}

/// `{ "mensagem": ... }` acknowledgement.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub mensagem: String,
}
