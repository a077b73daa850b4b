//! Token session with age-based renewal.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use vision_core::error::{AuthError, Error, TransportError};
use vision_core::{AccessToken, ApiUrl, Credentials, ResourcePath, Result};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::endpoints::{AUTH_TOKEN, TokenRequest, TokenResponse};

/// Authorization headers for one token. Cheap to clone and share across
/// concurrent page tasks.
#[derive(Clone)]
pub struct AuthHeaders(Arc<HeaderMap>);

impl AuthHeaders {
    fn from_token(token: &AccessToken) -> Result<Self> {
        let mut value =
            HeaderValue::from_str(&token.bearer()).map_err(|_| AuthError::MalformedToken)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(Self(Arc::new(headers)))
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthHeaders").field(&"[REDACTED]").finish()
    }
}

/// An authenticated session against the Vision API.
///
/// Owns the credentials and the current token. [`AuthSession::ensure_fresh`]
/// re-authenticates once the token is at least `renewal_threshold` old and
/// otherwise hands out the cached headers. Clones share the same state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: ApiClient,
    credentials: Credentials,
    renewal_threshold: Duration,
    auth_timeout: Duration,
    state: RwLock<SessionState>,
    // Serializes renewals so concurrent callers trigger one token request.
    renewal: Mutex<()>,
}

struct SessionState {
    headers: AuthHeaders,
    issued: Instant,
    issued_at: DateTime<Utc>,
}

impl AuthSession {
    /// Authenticate against `config.base_url` and start a session.
    #[instrument(skip(config, credentials), fields(base = %config.base_url, username = %credentials.username()))]
    pub async fn login(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        let client = ApiClient::new(config.base_url.clone())?;
        let state = request_token(&client, &credentials, config.auth_timeout).await?;
        info!("Authenticated");

        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                credentials,
                renewal_threshold: config.renewal_threshold,
                auth_timeout: config.auth_timeout,
                state: RwLock::new(state),
                renewal: Mutex::new(()),
            }),
        })
    }

    /// Request a new token and replace the stored one.
    ///
    /// Returns the new headers and their issue time. On failure the previous
    /// token is kept.
    #[instrument(skip(self), fields(base = %self.inner.client.base_url()))]
    pub async fn authenticate(&self) -> Result<(AuthHeaders, DateTime<Utc>)> {
        let state = request_token(
            &self.inner.client,
            &self.inner.credentials,
            self.inner.auth_timeout,
        )
        .await?;

        let result = (state.headers.clone(), state.issued_at);
        *self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = state;
        debug!("Token replaced");
        Ok(result)
    }

    /// Returns headers backed by a token younger than the renewal
    /// threshold, re-authenticating first if needed.
    pub async fn ensure_fresh(&self) -> Result<AuthHeaders> {
        if !self.is_stale() {
            return Ok(self.headers());
        }

        let _guard = self.inner.renewal.lock().await;
        if !self.is_stale() {
            return Ok(self.headers());
        }

        info!(
            age_secs = self.age().as_secs(),
            threshold_secs = self.inner.renewal_threshold.as_secs(),
            "Token stale, renewing"
        );
        let (headers, _) = self.authenticate().await?;
        Ok(headers)
    }

    /// Current headers, without a freshness check.
    pub fn headers(&self) -> AuthHeaders {
        self.read_state(|s| s.headers.clone())
    }

    /// Wall-clock time the current token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.read_state(|s| s.issued_at)
    }

    /// Age of the current token.
    pub fn age(&self) -> Duration {
        self.read_state(|s| s.issued.elapsed())
    }

    pub fn is_stale(&self) -> bool {
        self.age() >= self.inner.renewal_threshold
    }

    pub fn renewal_threshold(&self) -> Duration {
        self.inner.renewal_threshold
    }

    pub fn base_url(&self) -> &ApiUrl {
        self.inner.client.base_url()
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    fn read_state<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("base_url", self.base_url())
            .field("username", &self.inner.credentials.username())
            .field("renewal_threshold", &self.inner.renewal_threshold)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

async fn request_token(
    client: &ApiClient,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<SessionState> {
    let path = ResourcePath::new(AUTH_TOKEN)?;
    let form = TokenRequest {
        username: credentials.username(),
        password: credentials.password(),
        client_id: credentials.client_id(),
        client_secret: credentials.client_secret(),
    };

    let body = match client.post_form(&path, &form, timeout).await {
        Ok(body) => body,
        Err(Error::Transport(TransportError::Decode { message })) => {
            return Err(AuthError::InvalidResponse { message }.into());
        }
        Err(Error::Transport(err)) => return Err(AuthError::Unreachable(err).into()),
        Err(Error::Protocol(err)) => {
            return Err(AuthError::Rejected {
                status: err.status,
                message: err.detail,
            }
            .into());
        }
        Err(err) => return Err(err),
    };

    let token = serde_json::from_value::<TokenResponse>(body)
        .ok()
        .and_then(|r| r.access_token)
        .filter(|t| !t.is_empty())
        .map(AccessToken::new)
        .ok_or(AuthError::MissingAccessToken)?;

    Ok(SessionState {
        headers: AuthHeaders::from_token(&token)?,
        issued: Instant::now(),
        issued_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_bearer_token() {
        let headers = AuthHeaders::from_token(&AccessToken::new("abc")).unwrap();
        assert_eq!(headers.as_map()[AUTHORIZATION], "Bearer abc");
        assert!(headers.as_map()[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn headers_debug_is_redacted() {
        let headers = AuthHeaders::from_token(&AccessToken::new("abc")).unwrap();
        assert!(!format!("{:?}", headers).contains("abc"));
    }

    #[test]
    fn malformed_token_rejected() {
        let err = AuthHeaders::from_token(&AccessToken::new("bad\ntoken")).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::MalformedToken)));
    }
}
