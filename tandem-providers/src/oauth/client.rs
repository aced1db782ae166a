//! OAuth2 client for one backend identity.
//!
//! The client owns the credential state machine:
//!
//! ```text
//! Unauthenticated -> Ready                        (cache hit, valid)
//! Unauthenticated -> Refreshing -> Ready          (cache hit, expired, refresh token)
//! Unauthenticated -> AwaitingUserAuthorization -> Ready   (interactive login)
//! any -> Cleared                                  (invalidate)
//! ```
//!
//! All state lives behind one async mutex, so concurrent callers on the same
//! client serialize through a refresh instead of refreshing twice.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use tandem_core::{BackendKind, Credentials};
use tandem_fetch::{AuthError, HttpClient, HttpError};
use tandem_store::{CredentialStore, StoreError};

use super::config::OAuthConfig;

/// Callback invoked with new credentials after a refresh is persisted.
pub type RefreshHook = Arc<dyn Fn(&Credentials) + Send + Sync>;

// ============================================================================
// Client State
// ============================================================================

/// Observable credential state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No usable credentials are held.
    Unauthenticated,
    /// A refresh grant is in flight.
    Refreshing,
    /// An interactive login is waiting for the browser callback.
    AwaitingUserAuthorization,
    /// A valid access token is held.
    Ready,
    /// Credentials were explicitly invalidated.
    Cleared,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientState::Unauthenticated => write!(f, "unauthenticated"),
            ClientState::Refreshing => write!(f, "refreshing"),
            ClientState::AwaitingUserAuthorization => write!(f, "awaiting authorization"),
            ClientState::Ready => write!(f, "ready"),
            ClientState::Cleared => write!(f, "cleared"),
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_credentials(self) -> Credentials {
        Credentials::issued_at(
            Utc::now(),
            self.access_token,
            self.refresh_token.filter(|t| !t.is_empty()),
            self.token_type,
            self.expires_in,
        )
    }
}

/// Identity returned by the user-info endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    /// Stable user identifier (`id` or `sub`).
    pub id: Option<String>,
    /// Email address, if disclosed.
    pub email: Option<String>,
    /// Display name, if disclosed.
    pub name: Option<String>,
    /// The full response body.
    pub raw: serde_json::Value,
}

impl UserInfo {
    fn from_value(raw: serde_json::Value) -> Self {
        let text = |key: &str| match raw.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            id: text("id").or_else(|| text("sub")),
            email: text("email"),
            name: text("name"),
            raw,
        }
    }
}

// ============================================================================
// OAuth2 Client
// ============================================================================

struct Inner {
    credentials: Option<Credentials>,
    loaded: bool,
    state: ClientState,
    /// State to restore if an interactive login is abandoned.
    before_authorization: Option<ClientState>,
}

/// Produces valid bearer tokens for one backend identity.
pub struct OAuth2Client {
    kind: BackendKind,
    config: OAuthConfig,
    store: CredentialStore,
    http: HttpClient,
    refresh_hook: Option<RefreshHook>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for OAuth2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Client")
            .field("kind", &self.kind)
            .field("client_id", &self.config.client_id)
            .field("token_url", &self.config.token_url)
            .field("store", &self.store.dir())
            .finish_non_exhaustive()
    }
}

impl OAuth2Client {
    /// Creates a client. The credential cache is read lazily on first use.
    pub fn new(
        kind: BackendKind,
        config: OAuthConfig,
        store: CredentialStore,
        http: HttpClient,
    ) -> Self {
        Self {
            kind,
            config,
            store,
            http,
            refresh_hook: None,
            inner: Mutex::new(Inner {
                credentials: None,
                loaded: false,
                state: ClientState::Unauthenticated,
                before_authorization: None,
            }),
        }
    }

    /// Registers a hook called after each successful refresh.
    #[must_use]
    pub fn with_refresh_hook(mut self, hook: RefreshHook) -> Self {
        self.refresh_hook = Some(hook);
        self
    }

    /// Returns the backend this client authenticates.
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Returns the OAuth configuration.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Returns the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Returns the current state.
    pub async fn state(&self) -> ClientState {
        self.inner.lock().await.state
    }

    /// Returns the cached credentials, loading them if needed.
    pub async fn credentials(&self) -> Option<Credentials> {
        let mut inner = self.inner.lock().await;
        self.ensure_loaded(&mut inner).await;
        inner.credentials.clone()
    }

    // ========================================================================
    // Token access
    // ========================================================================

    /// Returns a valid access token, refreshing it if expired.
    ///
    /// Never starts an interactive login.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if no credentials exist (no network call is made)
    /// - [`AuthError::RefreshFailed`] if the token expired and cannot be refreshed
    #[instrument(skip(self), fields(backend = %self.kind))]
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        let mut inner = self.inner.lock().await;
        self.ensure_loaded(&mut inner).await;

        let Some(creds) = inner.credentials.clone() else {
            inner.state = ClientState::Unauthenticated;
            return Err(self.unauthenticated());
        };

        if !creds.is_expired() {
            inner.state = ClientState::Ready;
            return Ok(creds.access_token);
        }

        let Some(refresh_token) = creds.refresh_token.filter(|t| !t.is_empty()) else {
            inner.state = ClientState::Unauthenticated;
            return Err(AuthError::RefreshFailed(
                "access token expired and no refresh token is available".to_string(),
            ));
        };

        debug!("Access token expired, refreshing");
        let refreshed = self.refresh_locked(&mut inner, &refresh_token).await?;
        Ok(refreshed.access_token)
    }

    /// Forces a refresh grant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] without credentials, or
    /// [`AuthError::RefreshFailed`] if the grant is rejected.
    #[instrument(skip(self), fields(backend = %self.kind))]
    pub async fn refresh(&self) -> Result<Credentials, AuthError> {
        let mut inner = self.inner.lock().await;
        self.ensure_loaded(&mut inner).await;

        let Some(creds) = inner.credentials.clone() else {
            return Err(self.unauthenticated());
        };
        let Some(refresh_token) = creds.refresh_token.filter(|t| !t.is_empty()) else {
            return Err(AuthError::RefreshFailed(
                "no refresh token is available".to_string(),
            ));
        };

        self.refresh_locked(&mut inner, &refresh_token).await
    }

    async fn refresh_locked(
        &self,
        inner: &mut Inner,
        refresh_token: &str,
    ) -> Result<Credentials, AuthError> {
        inner.state = ClientState::Refreshing;
        info!(backend = %self.kind, "Refreshing access token");

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let result = self
            .request_token(&params)
            .await
            .map_err(|e| e.into_auth_error(AuthError::RefreshFailed));
        let mut creds = match result {
            Ok(creds) => creds,
            Err(e) => {
                inner.state = ClientState::Unauthenticated;
                return Err(e);
            }
        };

        if creds.refresh_token.is_none() {
            creds.refresh_token = Some(refresh_token.to_string());
        }

        // The server may have rotated the refresh token; keep it even if the
        // cache cannot be written.
        inner.credentials = Some(creds.clone());
        inner.state = ClientState::Ready;

        match self.store.save_credentials(&creds).await {
            Ok(()) => debug!("Refreshed credentials persisted"),
            Err(e) => warn!(
                backend = %self.kind,
                error = %e,
                "Refreshed credentials held in memory only"
            ),
        }

        if let Some(hook) = &self.refresh_hook {
            hook(&creds);
        }

        Ok(creds)
    }

    /// Exchanges an authorization code for credentials and persists them.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenExchangeFailed`] if the grant is rejected.
    #[instrument(skip(self, code), fields(backend = %self.kind))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Credentials, AuthError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let mut inner = self.inner.lock().await;
        let result = self
            .request_token(&params)
            .await
            .map_err(|e| e.into_auth_error(AuthError::TokenExchangeFailed));
        let creds = match result {
            Ok(creds) => creds,
            Err(e) => {
                inner.state = inner
                    .before_authorization
                    .take()
                    .unwrap_or(ClientState::Unauthenticated);
                return Err(e);
            }
        };

        self.store.save_credentials(&creds).await.map_err(storage)?;
        inner.credentials = Some(creds.clone());
        inner.loaded = true;
        inner.state = ClientState::Ready;
        inner.before_authorization = None;
        info!(backend = %self.kind, "Authorization code exchanged");

        Ok(creds)
    }

    /// Posts a grant to the token endpoint.
    async fn request_token(&self, params: &[(&str, &str)]) -> Result<Credentials, GrantFailure> {
        let response = self
            .http
            .post_form(&self.config.token_url, params)
            .await
            .map_err(GrantFailure::Transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GrantFailure::Transport(e.into()))?;

        if !status.is_success() {
            warn!(status = %status, "Token endpoint rejected grant");
            return Err(GrantFailure::Rejected(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GrantFailure::Rejected(format!("invalid token response: {e}")))?;
        Ok(token.into_credentials())
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Fetches the user's identity and caches the user identifier.
    ///
    /// # Errors
    ///
    /// Returns token errors from [`OAuth2Client::get_access_token`], or
    /// [`AuthError::Unauthorized`] if the endpoint rejects the token.
    #[instrument(skip(self), fields(backend = %self.kind))]
    pub async fn get_user_info(&self) -> Result<UserInfo, AuthError> {
        let token = self.get_access_token().await?;

        let response = self.http.get_bearer(&self.config.userinfo_url, &token).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Unauthorized(format!("{status}: {body}")));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuthError::ProtocolError(format!("invalid user info: {e}")))?;
        let info = UserInfo::from_value(raw);

        if let Some(id) = &info.id {
            self.store.save_user_id(id).await.map_err(storage)?;
            debug!("Cached user identifier");
        }

        Ok(info)
    }

    /// Returns the cached user identifier, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the file cannot be read.
    pub async fn cached_user_id(&self) -> Result<Option<String>, AuthError> {
        self.store.load_user_id().await.map_err(storage)
    }

    /// Deletes cached credentials and the user identifier. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if a file exists but cannot be removed.
    #[instrument(skip(self), fields(backend = %self.kind))]
    pub async fn invalidate(&self) -> Result<(), AuthError> {
        let mut inner = self.inner.lock().await;
        self.store.clear().await.map_err(storage)?;
        inner.credentials = None;
        inner.loaded = true;
        inner.state = ClientState::Cleared;
        info!(backend = %self.kind, "Credentials invalidated");
        Ok(())
    }

    // ========================================================================
    // Interactive hand-off
    // ========================================================================

    /// Marks the client as waiting for an interactive login.
    pub(crate) async fn begin_authorization(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != ClientState::AwaitingUserAuthorization {
            inner.before_authorization = Some(inner.state);
        }
        inner.state = ClientState::AwaitingUserAuthorization;
    }

    /// Reverts an abandoned interactive login to the state it interrupted.
    pub(crate) async fn abort_authorization(&self) {
        let mut inner = self.inner.lock().await;
        let previous = inner.before_authorization.take();
        if inner.state == ClientState::AwaitingUserAuthorization {
            inner.state = previous.unwrap_or(ClientState::Unauthenticated);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn ensure_loaded(&self, inner: &mut Inner) {
        if inner.loaded {
            return;
        }

        inner.credentials = match self.store.load_credentials().await {
            Ok(creds) => creds,
            Err(e) => {
                warn!(
                    backend = %self.kind,
                    error = %e,
                    "Ignoring unreadable credential cache"
                );
                None
            }
        };
        inner.loaded = true;
    }

    fn unauthenticated(&self) -> AuthError {
        AuthError::Unauthenticated(self.kind.display_name().to_string())
    }
}

/// Why a token grant did not produce credentials.
enum GrantFailure {
    Transport(HttpError),
    Rejected(String),
}

impl GrantFailure {
    fn into_auth_error(self, rejected: fn(String) -> AuthError) -> AuthError {
        match self {
            GrantFailure::Transport(e) => AuthError::Http(e),
            GrantFailure::Rejected(detail) => rejected(detail),
        }
    }
}

fn storage(error: StoreError) -> AuthError {
    AuthError::Storage(error.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        _dir: TempDir,
        server: MockServer,
        store: CredentialStore,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = CredentialStore::new(dir.path().join("gemini"));
            Self {
                _dir: dir,
                server: MockServer::start().await,
                store,
            }
        }

        fn client(&self) -> OAuth2Client {
            let uri = self.server.uri();
            let config = OAuthConfig::new(
                "client-id",
                format!("{uri}/auth"),
                format!("{uri}/token"),
                format!("{uri}/userinfo"),
            )
            .with_client_secret("secret");

            OAuth2Client::new(
                BackendKind::Gemini,
                config,
                self.store.clone(),
                HttpClient::new().unwrap(),
            )
        }
    }

    fn expired_creds() -> Credentials {
        Credentials::new("old-token")
            .with_refresh_token("refresh-1")
            .with_expiry(Utc::now() - Duration::minutes(5))
    }

    #[tokio::test]
    async fn test_no_credentials_is_unauthenticated_without_network() {
        let fx = Fixture::new().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&fx.server)
            .await;

        let client = fx.client();
        let err = client.get_access_token().await.unwrap_err();

        assert!(matches!(err, AuthError::Unauthenticated(_)));
        assert_eq!(client.state().await, ClientState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_valid_cached_token_skips_refresh() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(
                &Credentials::new("cached")
                    .with_refresh_token("r")
                    .with_expiry(Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&fx.server)
            .await;

        let client = fx.client();

        assert_eq!(client.get_access_token().await.unwrap(), "cached");
        assert_eq!(client.state().await, ClientState::Ready);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_exactly_once() {
        let fx = Fixture::new().await;
        fx.store.save_credentials(&expired_creds()).await.unwrap();
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&fx.server)
            .await;

        let hook_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hook_calls);
        let client = fx.client().with_refresh_hook(Arc::new(move |creds: &Credentials| {
            assert_eq!(creds.access_token, "new-token");
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(client.get_access_token().await.unwrap(), "new-token");
        assert_eq!(client.get_access_token().await.unwrap(), "new-token");
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1);

        let persisted = fx.store.load_credentials().await.unwrap().unwrap();
        assert_eq!(persisted.access_token, "new-token");
        assert_eq!(persisted.refresh_token.as_deref(), Some("refresh-1"));
        assert!(persisted.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let fx = Fixture::new().await;
        fx.store.save_credentials(&expired_creds()).await.unwrap();
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shared",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&fx.server)
            .await;

        let client = fx.client();
        let (a, b) = tokio::join!(client.get_access_token(), client.get_access_token());

        assert_eq!(a.unwrap(), "shared");
        assert_eq!(b.unwrap(), "shared");
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_fails() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(
                &Credentials::new("stale").with_expiry(Utc::now() - Duration::minutes(1)),
            )
            .await
            .unwrap();

        let err = fx.client().get_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshFailed(_)));
    }

    #[tokio::test]
    async fn test_refresh_rejection_carries_status_and_body() {
        let fx = Fixture::new().await;
        fx.store.save_credentials(&expired_creds()).await.unwrap();
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&fx.server)
            .await;

        let client = fx.client();
        let err = client.refresh().await.unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, AuthError::RefreshFailed(_)));
        assert!(message.contains("400"));
        assert!(message.contains("invalid_grant"));
        assert_eq!(client.state().await, ClientState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_exchange_code_persists_credentials() {
        let fx = Fixture::new().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "refresh_token": "refresh-2",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&fx.server)
            .await;

        let client = fx.client();
        let creds = client
            .exchange_code("abc", "http://127.0.0.1:1/oauth2callback")
            .await
            .unwrap();

        assert_eq!(creds.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(client.state().await, ClientState::Ready);
        assert_eq!(client.get_access_token().await.unwrap(), "fresh");
        assert_eq!(
            fx.store.load_credentials().await.unwrap().unwrap().access_token,
            "fresh"
        );
    }

    #[tokio::test]
    async fn test_exchange_rejection() {
        let fx = Fixture::new().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
            .mount(&fx.server)
            .await;

        let err = fx.client().exchange_code("abc", "http://x").await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExchangeFailed(_)));
    }

    #[tokio::test]
    async fn test_user_info_caches_identifier() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(&Credentials::new("tok"))
            .await
            .unwrap();
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "user-42",
                "email": "a@example.com"
            })))
            .expect(1)
            .mount(&fx.server)
            .await;

        let client = fx.client();
        let info = client.get_user_info().await.unwrap();

        assert_eq!(info.id.as_deref(), Some("user-42"));
        assert_eq!(info.email.as_deref(), Some("a@example.com"));
        assert_eq!(client.cached_user_id().await.unwrap().as_deref(), Some("user-42"));
    }

    #[tokio::test]
    async fn test_user_info_rejection_is_unauthorized() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(&Credentials::new("tok"))
            .await
            .unwrap();
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&fx.server)
            .await;

        let err = fx.client().get_user_info().await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(&Credentials::new("tok"))
            .await
            .unwrap();
        fx.store.save_user_id("user").await.unwrap();

        let client = fx.client();
        assert!(client.get_access_token().await.is_ok());

        client.invalidate().await.unwrap();
        client.invalidate().await.unwrap();

        assert_eq!(client.state().await, ClientState::Cleared);
        assert!(!fx.store.credentials_path().exists());
        assert!(client.cached_user_id().await.unwrap().is_none());
        assert!(matches!(
            client.get_access_token().await,
            Err(AuthError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_unauthenticated() {
        let fx = Fixture::new().await;
        tokio::fs::create_dir_all(fx.store.dir()).await.unwrap();
        tokio::fs::write(fx.store.credentials_path(), "{ nope")
            .await
            .unwrap();

        let err = fx.client().get_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_refresh_survives_unwritable_cache() {
        let fx = Fixture::new().await;
        fx.store.save_credentials(&expired_creds()).await.unwrap();
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "rotated-access",
                "refresh_token": "rotated-refresh",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&fx.server)
            .await;

        let client = fx.client();
        assert!(client.credentials().await.is_some());

        // Replace the cache directory with a plain file so the write fails.
        tokio::fs::remove_dir_all(fx.store.dir()).await.unwrap();
        tokio::fs::write(fx.store.dir(), "not a directory").await.unwrap();

        assert_eq!(client.get_access_token().await.unwrap(), "rotated-access");
        assert_eq!(client.state().await, ClientState::Ready);

        let held = client.credentials().await.unwrap();
        assert_eq!(held.refresh_token.as_deref(), Some("rotated-refresh"));
        assert_eq!(client.get_access_token().await.unwrap(), "rotated-access");
    }

    #[tokio::test]
    async fn test_abort_restores_state_before_login() {
        let fx = Fixture::new().await;
        fx.store
            .save_credentials(&Credentials::new("tok"))
            .await
            .unwrap();
        let client = fx.client();
        client.get_access_token().await.unwrap();

        client.begin_authorization().await;
        assert_eq!(client.state().await, ClientState::AwaitingUserAuthorization);
        client.abort_authorization().await;

        assert_eq!(client.state().await, ClientState::Ready);
    }

    #[tokio::test]
    async fn test_abort_without_prior_session_is_unauthenticated() {
        let fx = Fixture::new().await;
        let client = fx.client();

        client.begin_authorization().await;
        client.abort_authorization().await;

        assert_eq!(client.state().await, ClientState::Unauthenticated);
    }

    #[test]
    fn test_debug_omits_client_secret() {
        let dir = TempDir::new().unwrap();
        let client = OAuth2Client::new(
            BackendKind::Gemini,
            OAuthConfig::new("cid", "a", "t", "u").with_client_secret("hunter2"),
            CredentialStore::new(dir.path().join("gemini")),
            HttpClient::new().unwrap(),
        );

        let debug = format!("{client:?}");

        assert!(debug.contains("cid"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_user_info_accepts_numeric_id() {
        let info = UserInfo::from_value(serde_json::json!({"id": 123, "name": "Ada"}));
        assert_eq!(info.id.as_deref(), Some("123"));
        assert_eq!(info.name.as_deref(), Some("Ada"));
    }
}
