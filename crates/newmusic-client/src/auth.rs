//! Anonymous auth endpoints.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use newmusic_core::error::AuthError;
use newmusic_core::{
    AccessToken, ApiUrl, Credentials, Error, LoginResponse, RefreshToken, Result, TokenPair,
};

use crate::api::{
    FORGOT_PASSWORD, ForgotPasswordRequest, LOGIN, LoginRequest, MessageResponse, REFRESH,
    RESET_PASSWORD, RefreshRequest, RefreshResponse, ResetPasswordRequest,
};
use crate::factory::ClientConfig;
use crate::http::{build_http_client, read_response, transport_error};

/// Client for the `auth/*` endpoints.
///
/// Owns its own HTTP client, so calls made here never pass through the
/// authenticated pipeline. Clone is cheap.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    base: ApiUrl,
}

impl AuthApi {
    /// Create the auth endpoint client.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            base: config.base.clone(),
        })
    }

    /// Open a session with e-mail and password.
    ///
    /// # Errors
    ///
    /// A 401 becomes [`AuthError::InvalidCredentials`] carrying the
    /// backend's message; other failures are returned as-is.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        info!("Logging in");

        let request = LoginRequest {
            email: credentials.email(),
            senha: credentials.password(),
        };

        match self.post(LOGIN, &request).await {
            Err(Error::Api(err)) if err.is_unauthorized() => Err(AuthError::InvalidCredentials {
                message: err.message().to_string(),
            }
            .into()),
            result => result,
        }
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Any non-2xx answer becomes [`AuthError::RefreshRejected`].
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair> {
        debug!("Requesting token renewal");

        let request = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };

        let response: RefreshResponse = match self.post(REFRESH, &request).await {
            Ok(response) => response,
            Err(Error::Api(err)) => {
                return Err(AuthError::RefreshRejected { status: err.status }.into());
            }
            Err(err) => return Err(err),
        };

        Ok(TokenPair {
            access_token: AccessToken::new(response.access_token),
            refresh_token: RefreshToken::new(response.refresh_token),
        })
    }

    /// Ask the backend to e-mail a password reset link. Returns the backend's message.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let response: MessageResponse = self
            .post(FORGOT_PASSWORD, &ForgotPasswordRequest { email })
            .await?;
        Ok(response.mensagem)
    }

    /// Set a new password with the token received by e-mail. Returns the backend's message.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        let request = ResetPasswordRequest {
            token,
            nova_senha: new_password,
        };
        let response: MessageResponse = self.post(RESET_PASSWORD, &request).await?;
        Ok(response.mensagem)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "auth request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await?.json()
    }
}
