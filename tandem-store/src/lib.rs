// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Tandem Store
//!
//! On-disk state for the Tandem client.
//!
//! This crate provides:
//!
//! - **CredentialStore**: Per-backend OAuth credential and user-id files
//! - **SettingsStore**: Read-only user settings with environment overrides
//! - **Persistence**: Atomic file writes with owner-only permissions
//!
//! ## Layout
//!
//! ```text
//! <config_dir>/tandem/
//! ├── settings.json
//! ├── gemini/
//! │   ├── oauth_creds.json
//! │   └── user_id
//! └── openai/
//!     ├── oauth_creds.json
//!     └── user_id
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use tandem_store::{CredentialStore, SettingsStore};
//! use tandem_core::BackendKind;
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let store = CredentialStore::for_backend(BackendKind::Gemini);
//! let creds = store.load_credentials().await?;
//! ```

pub mod credential_store;
pub mod error;
pub mod persistence;
pub mod settings;

pub use credential_store::CredentialStore;
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_settings_path, ensure_dir, load_json, load_json_or_default,
    load_text, remove_if_exists, save_json, save_text,
};
pub use settings::{BackendSettings, LogLevel, Settings, SettingsStore};
