//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use tandem_core::{BackendKind, BackendStatus, ExecutorConfig, ExecutorStatus};
use tandem_providers::{BackendDescriptor, UserInfo};
use tandem_store::BackendSettings;

// ============================================================================
// Output Types
// ============================================================================

/// Executor status output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub primary: BackendStatusOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<BackendStatusOutput>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One backend's availability.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatusOutput {
    pub backend: String,
    pub available: bool,
}

impl From<BackendStatus> for BackendStatusOutput {
    fn from(status: BackendStatus) -> Self {
        Self {
            backend: status.identity.cli_name().to_string(),
            available: status.available,
        }
    }
}

/// Backend info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfoOutput {
    pub id: String,
    pub display_name: String,
    pub cli_name: String,
    pub aliases: Vec<String>,
    pub base_url: String,
    pub default_model: String,
    pub signed_in: bool,
    pub primary: bool,
}

/// Signed-in identity output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOutput {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats executor status.
    pub fn format_status(
        &self,
        status: &ExecutorStatus,
        config: &ExecutorConfig,
        error: Option<String>,
    ) -> Result<String> {
        self.format(&StatusOutput {
            primary: status.primary.into(),
            fallback: status.fallback.map(Into::into),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            timeout_ms: config.timeout_ms,
            error,
        })
    }

    /// Formats the backend list.
    pub fn format_backends(
        &self,
        backends: &[(&BackendDescriptor, BackendSettings, bool)],
        primary: BackendKind,
    ) -> Result<String> {
        let outputs: Vec<BackendInfoOutput> = backends
            .iter()
            .map(|(desc, overrides, signed_in)| BackendInfoOutput {
                id: desc.id.to_string(),
                display_name: desc.display_name().to_string(),
                cli_name: desc.cli_name().to_string(),
                aliases: desc.cli.aliases.iter().map(ToString::to_string).collect(),
                base_url: desc.base_url(overrides),
                default_model: desc.model(overrides),
                signed_in: *signed_in,
                primary: desc.id == primary,
            })
            .collect();

        self.format(&outputs)
    }

    /// Formats a signed-in identity.
    pub fn format_user(&self, backend: BackendKind, user: &UserInfo) -> Result<String> {
        self.format(&UserOutput {
            backend: backend.cli_name().to_string(),
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_backend_status_output() {
        let output = BackendStatusOutput::from(BackendStatus::new(BackendKind::OpenAi, true));
        assert_eq!(output.backend, "openai");
        assert!(output.available);
    }
}
