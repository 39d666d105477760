//! Authenticated API client.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use newmusic_core::{AccessToken, ApiUrl, CredentialHolder, Error, FatalAuthHandler, Result};

use crate::api::{ApiRequest, ApiResponse};
use crate::auth::AuthApi;
use crate::http::{bearer_header, read_response, transport_error};

/// Path of the login entry point handed to the [`FatalAuthHandler`].
pub const LOGIN_ENTRY_PATH: &str = "/login";

/// HTTP client that authenticates every call and renews expired sessions.
///
/// Obtained from [`ClientFactory::client`](crate::ClientFactory::client).
/// Clone is cheap and clones share identity (see [`ApiClient::ptr_eq`]).
///
/// Each request goes through two stages:
///
/// - before sending, the current access token is read from the credential
///   holder and set as `Authorization: Bearer <token>`;
/// - on a 401, if the request was not retried yet and the holder has a
///   refresh token, the session is renewed through [`AuthApi::refresh`] and
///   the request is replayed exactly once. If renewal fails the holder is
///   logged out, the fatal handler is called and the original 401 is
///   returned.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base: ApiUrl,
    auth: AuthApi,
    holder: Option<Arc<dyn CredentialHolder>>,
    on_fatal: Option<Arc<dyn FatalAuthHandler>>,
    generation: u64,
}

impl ApiClient {
    pub(crate) fn new(
        http: reqwest::Client,
        base: ApiUrl,
        auth: AuthApi,
        holder: Option<Arc<dyn CredentialHolder>>,
        on_fatal: Option<Arc<dyn FatalAuthHandler>>,
        generation: u64,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base,
                auth,
                holder,
                on_fatal,
                generation,
            }),
        }
    }

    /// Returns the API base URL this client talks to.
    pub fn base(&self) -> &ApiUrl {
        &self.inner.base
    }

    /// The accessor generation this client was built for.
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Whether both handles refer to the same client instance.
    pub fn ptr_eq(a: &ApiClient, b: &ApiClient) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Send a request through the authenticated pipeline.
    ///
    /// # Errors
    ///
    /// Returns the replayed request's error after a renewal, the original
    /// 401 when renewal fails, and any other failure unchanged.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        match self.dispatch(&request).await {
            Ok(response) => Ok(response),
            Err(err) => self.recover(&mut request, err).await,
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// POST a JSON body to `path` and decode the JSON answer.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    /// PUT a JSON body to `path` and decode the JSON answer.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Attach credentials and perform one HTTP exchange.
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.inner.base.endpoint(request.path());

        let mut headers = request.headers().clone();
        if let Some(token) = self.bearer_token(request) {
            headers.insert(AUTHORIZATION, bearer_header(&token)?);
        }

        debug!(method = %request.method(), %url, retried = request.is_retried(), "API request");

        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), url.as_str())
            .headers(headers);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await.map_err(transport_error)?;
        read_response(response).await
    }

    /// A token patched in by a renewal wins over the holder's current one.
    fn bearer_token(&self, request: &ApiRequest) -> Option<AccessToken> {
        request.renewed_token().cloned().or_else(|| {
            self.inner
                .holder
                .as_ref()
                .and_then(|holder| holder.access_token())
        })
    }

    /// Renew-and-replay on an eligible 401, otherwise hand the error back.
    async fn recover(&self, request: &mut ApiRequest, err: Error) -> Result<ApiResponse> {
        if !err.is_unauthorized() || request.is_retried() {
            return Err(err);
        }
        let Some(holder) = self.inner.holder.clone() else {
            return Err(err);
        };
        let Some(refresh_token) = holder.refresh_token() else {
            debug!("401 without a refresh token, not renewing");
            return Err(err);
        };

        request.mark_retried();
        info!("Access token rejected, renewing session");

        let renewed = self
            .inner
            .auth
            .refresh(&refresh_token)
            .await
            .and_then(|tokens| match holder.token_updater() {
                Some(updater) => updater
                    .update_tokens(tokens.access_token.clone(), tokens.refresh_token)
                    .map(|()| tokens.access_token),
                None => Ok(tokens.access_token),
            });

        match renewed {
            Ok(access_token) => {
                request.renew(access_token);

                debug!("Replaying request with renewed token");
                self.dispatch(request).await
            }
            // A holder that cannot store the renewed tokens counts as a failed renewal.
            Err(renew_err) => {
                warn!(error = %renew_err, "Session renewal failed, signing out");

                if let Some(terminator) = holder.session_terminator() {
                    terminator.logout()?;
                }
                if let Some(handler) = &self.inner.on_fatal {
                    handler.on_fatal_auth_failure(LOGIN_ENTRY_PATH);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .field("generation", &self.inner.generation)
            .field("authenticated", &self.inner.holder.is_some())
            .finish()
    }
}
