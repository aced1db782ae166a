//! HTTP client with tracing and bearer helpers.
//!
//! The client carries only a connect timeout. Whole-request deadlines for
//! content calls are enforced by the executor so that long streaming
//! responses are not cut off; OAuth form posts get their own deadline.

use reqwest::{Client, Response, header};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// Connect timeout for all requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Deadline for OAuth token and user-info calls.
const AUTH_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent string for Tandem.
const USER_AGENT: &str = concat!("Tandem/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Build`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { inner: client })
    }

    /// Wraps an existing reqwest client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Performs a GET request with a bearer token.
    #[instrument(skip(self, token), fields(url = %url))]
    pub async fn get_bearer(&self, url: &str, token: &str) -> Result<Response, HttpError> {
        debug!("GET request with bearer auth");

        let response = self
            .inner
            .get(url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(AUTH_REQUEST_TIMEOUT_SECS))
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with a JSON body and a bearer token.
    #[instrument(skip(self, token, body), fields(url = %url))]
    pub async fn post_json_bearer<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with JSON");

        let response = self
            .inner
            .post(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with form data.
    #[instrument(skip(self, form), fields(url = %url))]
    pub async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        form: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with form data");

        let response = self
            .inner
            .post(url)
            .header(header::ACCEPT, "application/json")
            .form(form)
            .timeout(Duration::from_secs(AUTH_REQUEST_TIMEOUT_SECS))
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

/// Joins a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ============================================================================
// Tests
// ============================================================================
