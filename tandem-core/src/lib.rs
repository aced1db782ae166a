// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Tandem Core
//!
//! Core types and models for the Tandem content-generation client.
//!
//! This crate provides the foundational abstractions used across all other
//! Tandem crates, including:
//!
//! - The canonical request/response shapes exchanged with callers
//! - OAuth credential records
//! - Backend identities and executor tuning
//! - Error types
//!
//! ## Key Types
//!
//! ### Backend Types
//! - [`BackendKind`] - Enum of supported backend identities
//! - [`BackendStatus`] - Liveness flag for one executor slot
//! - [`ExecutorStatus`] - Primary and fallback slot status
//! - [`ExecutorConfig`] - Retry, timeout, and fallback tuning
//!
//! ### Content Types
//! - [`GenerateContentRequest`] / [`GenerateContentResponse`] - Generation
//! - [`CountTokensRequest`] / [`CountTokensResponse`] - Token counting
//! - [`EmbedContentRequest`] / [`EmbedContentResponse`] - Embeddings
//!
//! ### Credentials
//! - [`Credentials`] - Cached OAuth bearer credentials

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Backend types
    BackendKind,
    BackendStatus,
    ExecutorConfig,
    ExecutorStatus,
    // Content types
    Candidate,
    Content,
    ContentEmbedding,
    CountTokensRequest,
    CountTokensResponse,
    EmbedContentRequest,
    EmbedContentResponse,
    FinishReason,
    GenerateContentRequest,
    GenerateContentResponse,
    GenerationConfig,
    Part,
    Role,
    UsageMetadata,
    // Credentials
    Credentials,
};
