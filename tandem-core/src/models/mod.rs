//! Domain models for Tandem.
//!
//! ## Submodules
//!
//! - [`backend`] - Backend identity and executor status types
//! - [`config`] - Executor retry/timeout/fallback tuning
//! - [`content`] - Canonical request and response shapes
//! - [`credentials`] - Cached OAuth credentials

mod backend;
mod config;
mod content;
mod credentials;

// Re-export everything at the models level
pub use backend::{BackendKind, BackendStatus, ExecutorStatus};
pub use config::ExecutorConfig;
pub use content::{
    Candidate, Content, ContentEmbedding, CountTokensRequest, CountTokensResponse,
    EmbedContentRequest, EmbedContentResponse, FinishReason, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Part, Role, UsageMetadata,
};
pub use credentials::Credentials;
#[cfg(test)]
mod serde_tests;
