//! Error types.
//!
//! [`AuthError`] covers credential acquisition, [`GenerateError`] covers
//! content operations and the executor. Token failures reach callers
//! unchanged through [`GenerateError::Auth`].

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Auth Error
// ============================================================================

/// Error type for credential acquisition and OAuth flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials exist for the backend.
    #[error("Not authenticated with {0}")]
    Unauthenticated(String),

    /// The callback `state` did not match the session's nonce.
    #[error("OAuth state mismatch (possible CSRF)")]
    CsrfViolation,

    /// The authorization server returned an `error` parameter.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The callback request was malformed.
    #[error("OAuth protocol error: {0}")]
    ProtocolError(String),

    /// The refresh grant failed, or no refresh token was available.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// An API rejected the bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The authorization-code grant failed.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// No callback arrived in time.
    #[error("Timed out waiting for authorization after {0:?}")]
    Timeout(Duration),

    /// The browser could not be launched.
    #[error("Failed to open browser: {0}")]
    Browser(String),

    /// Credential storage failed.
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// The local callback listener failed.
    #[error("Callback listener error: {0}")]
    Listener(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}

// ============================================================================
// Generate Error
// ============================================================================

/// Error type for content operations.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A content endpoint returned a non-success status.
    #[error("Backend error: {status} {status_text}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Response body, for diagnostics.
        body: String,
    },

    /// HTTP success with an empty or unusable payload.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An attempt exceeded the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Neither slot holds a generator.
    #[error("No content generator available")]
    NoGeneratorAvailable,

    /// Primary and fallback both exhausted their attempts.
    #[error("All backends failed. Primary: {primary}; fallback: {fallback}")]
    AllBackendsFailed {
        /// Final primary error.
        primary: Box<GenerateError>,
        /// Final fallback error.
        fallback: Box<GenerateError>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration, detected at construction.
    #[error(transparent)]
    Core(#[from] tandem_core::CoreError),

    /// Missing or unusable generator configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerateError {
    /// Builds a backend error from a status code and body.
    pub fn backend(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        GenerateError::Backend {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body: body.into(),
        }
    }

    /// Returns the HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerateError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for credential failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, GenerateError::Auth(_))
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Client construction failed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// Tests
// ============================================================================
