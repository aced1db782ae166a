//! Core error types for Tandem.

use thiserror::Error;

/// Core error type for Tandem operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend name did not match any known identity.
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data in a model value.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
