//! Browser-based authorization-code flow.
//!
//! ## Flow
//!
//! 1. Bind a loopback callback listener on an OS-assigned port
//! 2. Build the authorization URL with a fresh `state` nonce
//! 3. Open the URL in the user's browser
//! 4. Wait for the one-shot callback and verify `state`
//! 5. Exchange the code through the [`OAuth2Client`]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use tandem_core::Credentials;
use tandem_fetch::AuthError;

use super::callback::CallbackListener;
use super::client::OAuth2Client;
use super::config::OAuthConfig;

/// Default bound on waiting for the browser callback.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Browser Launcher
// ============================================================================

/// Opens URLs for the user.
pub trait BrowserLauncher: Send + Sync {
    /// Opens the URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Browser`] if no browser could be launched.
    fn open(&self, url: &str) -> Result<(), AuthError>;
}

/// Launches the system default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), AuthError> {
        open::that(url).map_err(|e| AuthError::Browser(e.to_string()))
    }
}

// ============================================================================
// State Nonce
// ============================================================================

/// Generates a CSRF nonce: 32 random bytes, base64url without padding.
///
/// # Errors
///
/// Returns [`AuthError::ProtocolError`] if the system RNG fails.
pub fn generate_state() -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AuthError::ProtocolError("system random source failed".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Builds the authorization URL for a session.
///
/// # Errors
///
/// Returns [`AuthError::ProtocolError`] if the configured URL is invalid.
pub fn authorization_url(
    config: &OAuthConfig,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| AuthError::ProtocolError(format!("invalid authorization URL: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("response_type", "code");
        query.append_pair("client_id", &config.client_id);
        query.append_pair("redirect_uri", redirect_uri);
        if !config.scopes.is_empty() {
            query.append_pair("scope", &config.scope_string());
        }
        query.append_pair("state", state);
        for (key, value) in &config.extra_auth_params {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

// ============================================================================
// Interactive Authenticator
// ============================================================================

/// Runs the browser login for an [`OAuth2Client`].
pub struct InteractiveAuthenticator {
    client: Arc<OAuth2Client>,
    browser: Arc<dyn BrowserLauncher>,
    timeout: Duration,
}

impl InteractiveAuthenticator {
    /// Creates an authenticator using the system browser.
    pub fn new(client: Arc<OAuth2Client>) -> Self {
        Self {
            client,
            browser: Arc::new(SystemBrowser),
            timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    /// Replaces the browser launcher.
    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    /// Sets how long to wait for the callback.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the authorization-code flow and stores the resulting credentials.
    ///
    /// # Errors
    ///
    /// Returns the listener, browser, callback, or token-exchange failure.
    #[instrument(skip(self), fields(backend = %self.client.kind()))]
    pub async fn authenticate_interactively(&self) -> Result<Credentials, AuthError> {
        let config = self.client.config();
        let state = generate_state()?;

        let listener = CallbackListener::bind(
            state.clone(),
            config.success_url.clone(),
            config.failure_url.clone(),
        )
        .await?;
        let redirect_uri = listener.redirect_uri();
        let url = authorization_url(config, &redirect_uri, &state)?;

        self.client.begin_authorization().await;
        info!(port = listener.port(), "Opening browser for authorization");

        if let Err(e) = self.browser.open(url.as_str()) {
            self.client.abort_authorization().await;
            return Err(e);
        }

        let code = match listener.wait(self.timeout).await {
            Ok(code) => code,
            Err(e) => {
                self.client.abort_authorization().await;
                return Err(e);
            }
        };

        debug!("Callback received, exchanging code");
        self.client.exchange_code(&code, &redirect_uri).await
    }
}

// ============================================================================
// Tests
// ============================================================================
