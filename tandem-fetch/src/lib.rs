// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Tandem Fetch
//!
//! Transport plumbing and resilience for the Tandem client.
//!
//! ## Building Blocks
//!
//! - [`http::HttpClient`] - reqwest wrapper with tracing and bearer helpers
//! - [`sse`] - Line parser for `data:`-framed streaming responses
//! - [`retry::RetryStrategy`] - Exponential backoff schedule
//!
//! ## Generators
//!
//! - [`generator::ContentGenerator`] - One backend's four operations
//! - [`generator::GeneratorFactory`] - Builds a generator for a backend
//! - [`validation::Validate`] - Rejects semantically empty responses
//!
//! ## Executor
//!
//! [`executor::ResilientExecutor`] wraps a primary and an optional fallback
//! generator. Each call is retried on the primary with exponential backoff
//! and a per-attempt timeout, then handed to the fallback once the primary's
//! budget is exhausted.
//!
//! ```ignore
//! use tandem_fetch::ResilientExecutor;
//! use tandem_core::{BackendKind, ExecutorConfig, GenerateContentRequest};
//!
//! let config = ExecutorConfig::default().with_fallback(BackendKind::OpenAi);
//! let executor = ResilientExecutor::initialize(BackendKind::Gemini, config, &factory).await?;
//!
//! let response = executor
//!     .generate_content(&GenerateContentRequest::prompt("gemini-2.0-flash", "Hello"))
//!     .await?;
//! ```

pub mod error;
pub mod executor;
pub mod generator;
pub mod http;
pub mod retry;
pub mod sse;
pub mod validation;

// Errors
pub use error::{AuthError, GenerateError, HttpError};

// Transport
pub use http::HttpClient;
pub use retry::RetryStrategy;

// Generators & executor
pub use executor::ResilientExecutor;
pub use generator::{ContentGenerator, ContentStream, GeneratorFactory};
pub use validation::Validate;
