//! Authenticated request executor
//!
//! Wraps a gateway call with the session's bearer access token. A 401 on the
//! first attempt triggers exactly one refresh through `POST /auth/refresh`
//! (bearer = the refresh token read from durable storage), after which the
//! original request is re-issued once. A failed refresh ends the session.
//!
//! Concurrent 401s are coalesced by default: callers that failed under the
//! same session generation share a single refresh.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use relaychat_common::TokenStore;
use relaychat_domain::constants::AUTH_REFRESH_PATH;
use relaychat_domain::{ApiConfig, TokenPair};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ApiError;
use crate::http::{HttpClient, HttpTransport, ReqwestTransport, TransportError};

/// Request methods the gateway API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read; never carries a body
    Get,
    /// Write; body sent as JSON
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Configuration for [`AuthenticatedRequestExecutor`]
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Gateway base URL relative paths are resolved against
    pub base_url: String,
    /// Share one refresh between concurrent 401s
    pub coalesce_refresh: bool,
}

impl ExecutorConfig {
    /// Config for `base_url` with refresh coalescing on
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), coalesce_refresh: true }
    }

    /// Toggle sharing one refresh between concurrent 401s
    #[must_use]
    pub fn coalesce_refresh(mut self, enabled: bool) -> Self {
        self.coalesce_refresh = enabled;
        self
    }
}

impl From<&ApiConfig> for ExecutorConfig {
    fn from(api: &ApiConfig) -> Self {
        Self { base_url: api.gateway_url.clone(), coalesce_refresh: api.coalesce_refresh }
    }
}

/// Bearer-authenticated gateway access with a single refresh fallback
///
/// At most two attempts of the original request and at most one refresh per
/// [`execute`](Self::execute) call.
pub struct AuthenticatedRequestExecutor {
    transport: Arc<dyn HttpTransport>,
    store: Arc<TokenStore>,
    base_url: Url,
    refresh_url: Url,
    coalesce_refresh: bool,
    refresh_lock: Mutex<()>,
}

impl AuthenticatedRequestExecutor {
    /// Create an executor over an existing transport
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the base URL is not an absolute URL
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<TokenStore>,
        config: ExecutorConfig,
    ) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::Config(format!("invalid gateway URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "gateway URL '{}' cannot be used as a base",
                config.base_url
            )));
        }
        // Keep any path prefix when joining relative paths
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let refresh_url = join(&base_url, AUTH_REFRESH_PATH)?;

        Ok(Self {
            transport,
            store,
            base_url,
            refresh_url,
            coalesce_refresh: config.coalesce_refresh,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Build an executor with the reqwest transport described by `api`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the HTTP client cannot be built or the
    /// gateway URL is invalid
    pub fn from_config(api: &ApiConfig, store: Arc<TokenStore>) -> Result<Self, ApiError> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(client));
        Self::new(transport, store, ExecutorConfig::from(api))
    }

    /// Session store this executor reads and mutates
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Gateway URL relative paths resolve against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `url` against the gateway base URL
    ///
    /// Absolute URLs pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if `url` cannot be parsed
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => join(&self.base_url, url),
            Err(e) => Err(ApiError::Config(format!("invalid request URL '{url}': {e}"))),
        }
    }

    /// Issue an authenticated request
    ///
    /// `body` is ignored for GET. A first-attempt 401 (or no access token in
    /// memory) is converted into one refresh and one retry; every other
    /// failure is returned as is.
    ///
    /// # Errors
    ///
    /// - the first attempt's error when it is not a 401
    /// - the refresh error when the refresh fails (the session is ended first)
    /// - the second attempt's error, unchanged
    #[instrument(skip(self, body))]
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.resolve(url)?;
        let snapshot = self.store.snapshot().await;

        let failed_generation = match snapshot.access_token {
            Some(token) => match self.send(method, &url, body, &bearer_headers(&token)?).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_unauthorized() => {
                    debug!(generation = snapshot.generation, "Access token rejected");
                    snapshot.generation
                }
                Err(err) => return Err(err.into()),
            },
            None => {
                debug!("No access token in memory; recovering session from refresh token");
                snapshot.generation
            }
        };

        let token = self.recover(failed_generation).await?;

        match self.send(method, &url, body, &bearer_headers(&token)?).await {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = ApiError::from(err);
                if err.is_auth_expired() {
                    warn!("Refreshed access token rejected; ending session");
                    self.end_session().await;
                }
                Err(err)
            }
        }
    }

    /// Authenticated GET decoded into `T`
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); additionally [`ApiError::Decode`] if
    /// the body does not match `T`
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let value = self.execute(HttpMethod::Get, url, None).await?;
        decode(value)
    }

    /// Authenticated POST of `body` decoded into `T`
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); additionally [`ApiError::Decode`] if
    /// the body does not match `T`
    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        let value = self.execute(HttpMethod::Post, url, Some(&body)).await?;
        decode(value)
    }

    /// POST without credentials (login, registration)
    ///
    /// # Errors
    ///
    /// Returns the transport failure classified as [`ApiError`]
    pub async fn post_anonymous<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(url)?;
        let body = encode(body)?;
        let value = self.transport.post(url.as_str(), &body, &HeaderMap::new()).await?;
        decode(value)
    }

    /// Exchange `refresh_token` for a new pair without touching the session
    ///
    /// # Errors
    ///
    /// Returns the refresh endpoint's failure, or [`ApiError::Decode`] if the
    /// response is not a token pair
    pub async fn request_tokens(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let headers = bearer_headers(refresh_token)?;
        let value = self.transport.post(self.refresh_url.as_str(), &json!({}), &headers).await?;
        decode(value)
    }

    /// Refresh the session now, regardless of the access token's state
    ///
    /// Ends the session when the refresh fails.
    ///
    /// # Errors
    ///
    /// Returns the refresh error
    pub async fn force_refresh(&self) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_session().await.map(|_| ())
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<Value, TransportError> {
        match method {
            HttpMethod::Get => self.transport.get(url.as_str(), headers).await,
            HttpMethod::Post => {
                let empty = json!({});
                self.transport.post(url.as_str(), body.unwrap_or(&empty), headers).await
            }
        }
    }

    /// Obtain a usable access token after a failure under `failed_generation`
    async fn recover(&self, failed_generation: u64) -> Result<String, ApiError> {
        if !self.coalesce_refresh {
            return self.refresh_session().await;
        }

        let _guard = self.refresh_lock.lock().await;
        let current = self.store.snapshot().await;
        if current.generation == failed_generation {
            return self.refresh_session().await;
        }

        match current.access_token {
            Some(token) => {
                debug!(
                    failed_generation,
                    generation = current.generation,
                    "Session moved on while waiting; reusing access token"
                );
                Ok(token)
            }
            None => Err(ApiError::AuthExpired("session ended during token refresh".to_string())),
        }
    }

    /// One refresh round trip; ends the session on any failure
    async fn refresh_session(&self) -> Result<String, ApiError> {
        let tokens = match self.fetch_refreshed_pair().await {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, "Token refresh failed; ending session");
                self.end_session().await;
                return Err(err);
            }
        };

        let access_token = tokens.access_token.clone();
        if let Err(err) = self.store.refresh(tokens).await {
            warn!(error = %err, "Refreshed tokens could not be persisted; ending session");
            self.end_session().await;
            return Err(err.into());
        }

        info!("Session refreshed");
        Ok(access_token)
    }

    async fn fetch_refreshed_pair(&self) -> Result<TokenPair, ApiError> {
        let refresh_token = self
            .store
            .stored_refresh_token()
            .await?
            .ok_or_else(|| ApiError::AuthExpired("no refresh token stored".to_string()))?;
        self.request_tokens(&refresh_token).await
    }

    async fn end_session(&self) {
        if let Err(e) = self.store.logout().await {
            warn!(error = %e, "Logout could not remove the persisted refresh token");
        }
    }
}

impl fmt::Debug for AuthenticatedRequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedRequestExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("coalesce_refresh", &self.coalesce_refresh)
            .finish_non_exhaustive()
    }
}

fn join(base: &Url, path: &str) -> Result<Url, ApiError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::Config(format!("invalid request path '{path}': {e}")))
}

fn bearer_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ApiError::Config("token is not a valid header value".to_string()))?;
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Config(format!("failed to serialize request body: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
