//! Content generator abstraction.
//!
//! A [`ContentGenerator`] exposes one backend's four operations in the
//! Gemini-shaped vocabulary. A [`GeneratorFactory`] builds generators by
//! backend kind for the executor.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

use tandem_core::{
    BackendKind, CountTokensRequest, CountTokensResponse, EmbedContentRequest,
    EmbedContentResponse, GenerateContentRequest, GenerateContentResponse,
};

use crate::error::GenerateError;

/// Lazily produced, finite sequence of partial responses.
pub type ContentStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, GenerateError>> + Send>>;

// ============================================================================
// Generator Trait
// ============================================================================

/// One backend's content operations.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the backend this generator talks to.
    fn kind(&self) -> BackendKind;

    /// Produces a complete response for a conversation.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateError>;

    /// Opens a stream of partial responses.
    async fn generate_content_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ContentStream, GenerateError>;

    /// Counts the tokens of a conversation.
    async fn count_tokens(
        &self,
        request: &CountTokensRequest,
    ) -> Result<CountTokensResponse, GenerateError>;

    /// Produces an embedding for a piece of content.
    async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, GenerateError>;
}

// ============================================================================
// Factory Trait
// ============================================================================

/// Builds generators by backend kind.
#[async_trait]
pub trait GeneratorFactory: Send + Sync {
    /// Constructs a generator for a backend.
    async fn create(&self, kind: BackendKind) -> Result<Arc<dyn ContentGenerator>, GenerateError>;
}
