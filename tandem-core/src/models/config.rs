//! Executor tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::BackendKind;
use crate::error::CoreError;

/// Default attempts per backend.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base backoff delay in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Retry, timeout, and fallback configuration for the executor.
///
/// Immutable once handed to an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Attempts per backend, including the first one. Must be at least 1.
    pub max_retries: u32,
    /// Base backoff delay; attempt `n` waits `retry_delay_ms * 2^(n-1)`.
    pub retry_delay_ms: u64,
    /// Per-attempt timeout. Zero disables the timeout.
    pub timeout_ms: u64,
    /// Whether the fallback slot is used.
    pub enable_fallback: bool,
    /// The fallback backend identity.
    pub fallback_backend: Option<BackendKind>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            enable_fallback: false,
            fallback_backend: None,
        }
    }
}

impl ExecutorConfig {
    /// Enables fallback to the given backend.
    #[must_use]
    pub fn with_fallback(mut self, backend: BackendKind) -> Self {
        self.enable_fallback = true;
        self.fallback_backend = Some(backend);
        self
    }

    /// Sets the attempt budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base backoff delay.
    #[must_use]
    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the fallback identity if fallback is enabled.
    pub fn active_fallback(&self) -> Option<BackendKind> {
        if self.enable_fallback {
            self.fallback_backend
        } else {
            None
        }
    }

    /// Returns the per-attempt timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Validates the configuration against the chosen primary backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `max_retries` is zero, if
    /// fallback is enabled without a backend, or if the fallback equals the
    /// primary.
    pub fn validate(&self, primary: BackendKind) -> Result<(), CoreError> {
        if self.max_retries == 0 {
            return Err(CoreError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }

        if self.enable_fallback {
            match self.fallback_backend {
                None => {
                    return Err(CoreError::InvalidConfig(
                        "fallback enabled but no fallback backend set".to_string(),
                    ));
                }
                Some(fallback) if fallback == primary => {
                    return Err(CoreError::InvalidConfig(format!(
                        "fallback backend must differ from primary ({primary})"
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
