//! One-shot local listener for the OAuth redirect.
//!
//! The listener binds `127.0.0.1:0`, serves a single route, and hands the
//! first callback's outcome to the waiting session. Later requests get
//! `410 Gone`. The server is shut down when the listener is dropped.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, warn};

use tandem_fetch::AuthError;

/// Path the authorization server redirects to.
pub const CALLBACK_PATH: &str = "/oauth2callback";

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Tandem</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Authentication successful</h2>
<p>You can close this tab and return to the terminal.</p>
</body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Tandem</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Authentication failed</h2>
<p>Return to the terminal for details.</p>
</body>
</html>"#;

type Outcome = Result<String, AuthError>;

struct CallbackState {
    expected_state: String,
    success_url: Option<String>,
    failure_url: Option<String>,
    sender: Mutex<Option<oneshot::Sender<Outcome>>>,
}

// ============================================================================
// Callback Listener
// ============================================================================

/// A bound callback server waiting for one redirect.
pub struct CallbackListener {
    port: u16,
    receiver: oneshot::Receiver<Outcome>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl CallbackListener {
    /// Binds the listener on an OS-assigned loopback port.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Listener`] if the socket cannot be bound.
    pub async fn bind(
        expected_state: impl Into<String>,
        success_url: Option<String>,
        failure_url: Option<String>,
    ) -> Result<Self, AuthError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = listener.local_addr()?.port();

        let (sender, receiver) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let shared = Arc::new(CallbackState {
            expected_state: expected_state.into(),
            success_url,
            failure_url,
            sender: Mutex::new(Some(sender)),
        });

        let app = Router::new()
            .route(CALLBACK_PATH, get(handle_callback))
            .with_state(shared);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                warn!(error = %e, "Callback listener stopped with error");
            }
            debug!("Callback listener closed");
        });

        debug!(port, "Callback listener bound");
        Ok(Self {
            port,
            receiver,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Returns the bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the redirect URI to register with the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{CALLBACK_PATH}", self.port)
    }

    /// Waits for the callback and returns the authorization code.
    ///
    /// The server is shut down on every exit path.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Timeout`] if nothing arrives in time
    /// - [`AuthError::CsrfViolation`], [`AuthError::AuthorizationDenied`] or
    ///   [`AuthError::ProtocolError`] for a rejected callback
    pub async fn wait(mut self, timeout: Duration) -> Result<String, AuthError> {
        let outcome = match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(AuthError::ProtocolError(
                "callback listener closed unexpectedly".to_string(),
            )),
            Err(_) => Err(AuthError::Timeout(timeout)),
        };
        self.close();
        outcome
    }

    fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Handler
// ============================================================================

async fn handle_callback(
    State(shared): State<Arc<CallbackState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(sender) = shared.sender.lock().await.take() else {
        return (StatusCode::GONE, "Authorization already completed").into_response();
    };

    let outcome = evaluate_callback(&shared.expected_state, &params);
    let target = if outcome.is_ok() {
        shared.success_url.as_deref()
    } else {
        shared.failure_url.as_deref()
    };
    let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };

    let _ = sender.send(outcome);

    match target {
        Some(url) => Redirect::to(url).into_response(),
        None => Html(page).into_response(),
    }
}

/// Classifies callback query parameters.
///
/// The `state` check runs first so a forged redirect is reported as such
/// even when it also carries an `error`.
pub(crate) fn evaluate_callback(
    expected_state: &str,
    params: &HashMap<String, String>,
) -> Result<String, AuthError> {
    let state = params.get("state").map_or("", String::as_str);
    if !states_match(state, expected_state) {
        return Err(AuthError::CsrfViolation);
    }

    if let Some(error) = params.get("error") {
        let detail = match params.get("error_description") {
            Some(description) => format!("{error}: {description}"),
            None => error.clone(),
        };
        return Err(AuthError::AuthorizationDenied(detail));
    }

    match params.get("code") {
        Some(code) if !code.is_empty() => Ok(code.clone()),
        _ => Err(AuthError::ProtocolError(
            "callback did not include an authorization code".to_string(),
        )),
    }
}

/// Compares two nonces in constant time.
// ring 0.17 marks this deprecated without a replacement in the crate.
#[allow(deprecated)]
fn states_match(received: &str, expected: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(received.as_bytes(), expected.as_bytes()).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
