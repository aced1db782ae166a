//! User settings.
//!
//! Settings are read from `settings.json` and then overlaid with
//! `TANDEM_*` environment variables. The file is edited by hand; this
//! module never writes it back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tandem_core::{BackendKind, ExecutorConfig};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json};

// ============================================================================
// Settings Types
// ============================================================================

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend tried first.
    pub primary_backend: BackendKind,

    /// Retry, timeout, and fallback tuning.
    pub executor: ExecutorConfig,

    /// Per-backend overrides.
    pub backends: HashMap<BackendKind, BackendSettings>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_backend: BackendKind::Gemini,
            executor: ExecutorConfig::default(),
            backends: HashMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

/// Per-backend overrides. Unset fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// OAuth client id.
    pub client_id: Option<String>,

    /// OAuth client secret, for clients that have one.
    pub client_secret: Option<String>,

    /// Content API base URL.
    pub base_url: Option<String>,

    /// Authorization endpoint.
    pub auth_url: Option<String>,

    /// Token endpoint.
    pub token_url: Option<String>,

    /// User-info endpoint.
    pub userinfo_url: Option<String>,

    /// Default model for generation.
    pub model: Option<String>,

    /// Default model for embeddings.
    pub embedding_model: Option<String>,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Environment Overrides
// ============================================================================

/// Environment variable for the primary backend.
pub const ENV_PRIMARY_BACKEND: &str = "TANDEM_PRIMARY_BACKEND";
/// Environment variable for the fallback backend. Setting it enables fallback.
pub const ENV_FALLBACK_BACKEND: &str = "TANDEM_FALLBACK_BACKEND";
/// Environment variable for the attempt budget.
pub const ENV_MAX_RETRIES: &str = "TANDEM_MAX_RETRIES";
/// Environment variable for the base backoff delay.
pub const ENV_RETRY_DELAY_MS: &str = "TANDEM_RETRY_DELAY_MS";
/// Environment variable for the per-attempt timeout.
pub const ENV_TIMEOUT_MS: &str = "TANDEM_TIMEOUT_MS";

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| StoreError::Config(format!("{name}={value}: {e}")))
}

impl Settings {
    /// Returns the overrides for a backend, or empty overrides.
    pub fn backend(&self, kind: BackendKind) -> BackendSettings {
        self.backends.get(&kind).cloned().unwrap_or_default()
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if a variable is set to an unparsable value.
    pub fn apply_env(&mut self) -> Result<(), StoreError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if a value cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_PRIMARY_BACKEND) {
            self.primary_backend = parse_env(ENV_PRIMARY_BACKEND, &value)?;
        }
        if let Some(value) = get(ENV_FALLBACK_BACKEND) {
            self.executor.fallback_backend = Some(parse_env(ENV_FALLBACK_BACKEND, &value)?);
            self.executor.enable_fallback = true;
        }
        if let Some(value) = get(ENV_MAX_RETRIES) {
            self.executor.max_retries = parse_env(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = get(ENV_RETRY_DELAY_MS) {
            self.executor.retry_delay_ms = parse_env(ENV_RETRY_DELAY_MS, &value)?;
        }
        if let Some(value) = get(ENV_TIMEOUT_MS) {
            self.executor.timeout_ms = parse_env(ENV_TIMEOUT_MS, &value)?;
        }

        for kind in BackendKind::all() {
            let prefix = kind.env_prefix();
            let client_id = get(&format!("{prefix}_CLIENT_ID"));
            let client_secret = get(&format!("{prefix}_CLIENT_SECRET"));
            let base_url = get(&format!("{prefix}_BASE_URL"));

            if client_id.is_none() && client_secret.is_none() && base_url.is_none() {
                continue;
            }

            let entry = self.backends.entry(*kind).or_default();
            if client_id.is_some() {
                entry.client_id = client_id;
            }
            if client_secret.is_some() {
                entry.client_secret = client_secret;
            }
            if base_url.is_some() {
                entry.base_url = base_url;
            }
            debug!(backend = %kind, "Applied environment overrides");
        }

        Ok(())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Read-only settings holder.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding the given settings.
    pub fn new(path: PathBuf, settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if an environment override is invalid.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path, then applies environment overrides.
    ///
    /// A missing or malformed file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an environment override is invalid.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = read_settings(&path).await?;
        Ok(Self::new(path, settings))
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Re-reads the file and environment.
    ///
    /// # Errors
    ///
    /// Returns error if an environment override is invalid. The previous
    /// settings are kept in that case.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let settings = read_settings(&self.path).await?;
        *self.settings.write().await = settings;
        info!(path = %self.path.display(), "Settings reloaded");
        Ok(())
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_settings(path: &Path) -> Result<Settings, StoreError> {
    let mut settings = match load_json::<Settings>(path).await {
        Ok(settings) => {
            info!(path = %path.display(), "Loaded settings");
            settings
        }
        Err(e) if e.is_not_found() => {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        }
    };
    settings.apply_env()?;
    Ok(settings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.primary_backend, BackendKind::Gemini);
        assert_eq!(settings.executor, ExecutorConfig::default());
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_overrides_executor() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup(&[
                (ENV_PRIMARY_BACKEND, "openai"),
                (ENV_FALLBACK_BACKEND, "gemini"),
                (ENV_MAX_RETRIES, "5"),
                (ENV_RETRY_DELAY_MS, "10"),
                (ENV_TIMEOUT_MS, "0"),
            ]))
            .unwrap();

        assert_eq!(settings.primary_backend, BackendKind::OpenAi);
        assert!(settings.executor.enable_fallback);
        assert_eq!(settings.executor.fallback_backend, Some(BackendKind::Gemini));
        assert_eq!(settings.executor.max_retries, 5);
        assert_eq!(settings.executor.retry_delay_ms, 10);
        assert_eq!(settings.executor.timeout_ms, 0);
    }

    #[test]
    fn test_overrides_backend_fields() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup(&[
                ("TANDEM_GEMINI_CLIENT_ID", "cid"),
                ("TANDEM_OPENAI_BASE_URL", "http://localhost:9000/v1"),
            ]))
            .unwrap();

        assert_eq!(
            settings.backend(BackendKind::Gemini).client_id.as_deref(),
            Some("cid")
        );
        assert_eq!(
            settings.backend(BackendKind::OpenAi).base_url.as_deref(),
            Some("http://localhost:9000/v1")
        );
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(lookup(&[(ENV_MAX_RETRIES, "many")]));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_empty_override_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup(&[(ENV_PRIMARY_BACKEND, "  ")]))
            .unwrap();
        assert_eq!(settings.primary_backend, BackendKind::Gemini);
    }

    #[test]
    fn test_missing_backend_is_empty() {
        let settings = Settings::default();
        assert_eq!(settings.backend(BackendKind::OpenAi), BackendSettings::default());
    }
}
