// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Tandem Providers
//!
//! Backend-specific implementations for the Tandem client.
//!
//! Each backend module includes:
//!
//! - **Descriptor**: Static configuration (endpoints, OAuth scopes, models, CLI names)
//! - **Wire types**: Request/response shapes, translated once at the boundary
//! - **Generator**: The [`ContentGenerator`](tandem_fetch::ContentGenerator) implementation
//!
//! ## Supported Backends
//!
//! | Backend | Auth | Generate | Stream | Count | Embed |
//! |---------|------|----------|--------|-------|-------|
//! | Gemini (Google) | Google OAuth | `:generateContent` | `:streamGenerateContent` | `:countTokens` | `:embedContent` |
//! | OpenAI-compatible | OpenAI OAuth | `/chat/completions` | `stream: true` | `/tokenize` | `/embeddings` |
//!
//! ## OAuth
//!
//! [`oauth::OAuth2Client`] owns one backend's credential lifecycle.
//! [`oauth::InteractiveAuthenticator`] runs the browser flow on top of it.
//!
//! ## Usage
//!
//! ```ignore
//! use tandem_providers::DefaultGeneratorFactory;
//! use tandem_fetch::ResilientExecutor;
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let factory = DefaultGeneratorFactory::new(settings.clone())?;
//! let executor = ResilientExecutor::initialize(
//!     settings.primary_backend,
//!     settings.executor.clone(),
//!     &factory,
//! ).await?;
//! ```

pub mod backend;
pub mod descriptor;
pub mod factory;
pub mod oauth;
pub mod registry;

// Backend modules (alphabetical)
pub mod gemini;
pub mod openai;

#[cfg(test)]
mod testing;

// Re-exports
pub use descriptor::{BackendDescriptor, BackendMetadata, CliConfig, Endpoints, OAuthDefaults};
pub use factory::DefaultGeneratorFactory;
pub use gemini::GeminiGenerator;
pub use oauth::{
    BrowserLauncher, ClientState, InteractiveAuthenticator, OAuth2Client, OAuthConfig,
    SystemBrowser, UserInfo,
};
pub use openai::OpenAiGenerator;
pub use registry::BackendRegistry;
