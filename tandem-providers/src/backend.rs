//! Authenticated JSON transport shared by the generators.
//!
//! Every call asks the [`OAuth2Client`] for a token first. Token failures
//! propagate unchanged; non-success statuses become
//! [`GenerateError::Backend`] with the canonical reason phrase.

use futures::Stream;
use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use tandem_core::BackendKind;
use tandem_fetch::http::join_url;
use tandem_fetch::sse::parse_sse_lines;
use tandem_fetch::{GenerateError, HttpClient, HttpError};

use crate::oauth::OAuth2Client;

/// Raw SSE data payloads from an open streaming response.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<String, HttpError>> + Send>>;

/// Bearer-authenticated JSON transport for one backend.
#[derive(Clone)]
pub struct BackendTransport {
    auth: Arc<OAuth2Client>,
    http: HttpClient,
    base_url: String,
}

impl BackendTransport {
    /// Creates a transport rooted at `base_url`.
    pub fn new(auth: Arc<OAuth2Client>, http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http,
            base_url: base_url.into(),
        }
    }

    /// Returns the backend this transport authenticates for.
    pub fn kind(&self) -> BackendKind {
        self.auth.kind()
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a path against the base URL.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// POSTs a JSON body and decodes a JSON response.
    ///
    /// # Errors
    ///
    /// Returns token, transport, status, or decoding failures.
    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, GenerateError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.send(url, body).await?;
        let bytes = response.bytes().await.map_err(HttpError::from)?;
        debug!(bytes = bytes.len(), "Decoding backend response");
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POSTs a JSON body and returns the response's SSE data payloads.
    ///
    /// Dropping the returned stream releases the response body.
    ///
    /// # Errors
    ///
    /// Returns token, transport, or status failures from opening the stream.
    pub async fn post_stream<B>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<EventStream, GenerateError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self.send(url, body).await?;
        Ok(Box::pin(parse_sse_lines(Box::pin(response.bytes_stream()))))
    }

    async fn send<B>(&self, url: &str, body: &B) -> Result<Response, GenerateError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let token = self.auth.get_access_token().await?;
        let response = self.http.post_json_bearer(url, &token, body).await?;
        check_status(response).await
    }
}

/// Maps a non-success response to [`GenerateError::Backend`].
async fn check_status(response: Response) -> Result<Response, GenerateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Backend returned error status");
    Err(GenerateError::backend(status, body))
}

// ============================================================================
// Tests
// ============================================================================
