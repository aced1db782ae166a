//! Backend identity types.
//!
//! - [`BackendKind`] - Enum of supported backend identities
//! - [`BackendStatus`] - Whether a slot holds a constructed generator
//! - [`ExecutorStatus`] - Status for the primary and fallback slots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Backend Kind
// ============================================================================

/// A backend identity: one authentication provider plus one content API.
///
/// Identities are interchangeable from the executor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Google OAuth with the Gemini generative language API.
    Gemini,
    /// OpenAI-compatible OAuth with a chat completions API.
    #[serde(rename = "openai")]
    OpenAi,
}

impl BackendKind {
    /// Returns the display name for this backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Returns all backend kinds.
    pub fn all() -> &'static [BackendKind] {
        &[Self::Gemini, Self::OpenAi]
    }

    /// Returns the CLI name for this backend (lowercase, no spaces).
    ///
    /// Also used as the per-backend directory name on disk.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Returns the environment variable prefix for this backend.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::Gemini => "TANDEM_GEMINI",
            Self::OpenAi => "TANDEM_OPENAI",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.cli_name() == needle)
            .ok_or_else(|| CoreError::UnknownBackend(s.to_string()))
    }
}

// ============================================================================
// Status
// ============================================================================

/// Liveness of one executor slot.
///
/// Set once at construction. This is not a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Whether a generator was constructed for this slot.
    pub available: bool,
    /// Which backend the slot represents.
    pub identity: BackendKind,
}

impl BackendStatus {
    /// Creates a status record.
    pub fn new(identity: BackendKind, available: bool) -> Self {
        Self {
            available,
            identity,
        }
    }
}

/// Status of both executor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStatus {
    /// Primary slot.
    pub primary: BackendStatus,
    /// Fallback slot, present only when fallback is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<BackendStatus>,
}

impl ExecutorStatus {
    /// Returns true if at least one slot can serve requests.
    pub fn any_available(&self) -> bool {
        self.primary.available || self.fallback.is_some_and(|f| f.available)
    }
}

// ============================================================================
// Tests
// ============================================================================
