//! Text output formatting with colors.

use tandem_core::{
    BackendKind, BackendStatus, EmbedContentResponse, ExecutorConfig, ExecutorStatus,
    GenerateContentResponse, UsageMetadata,
};
use tandem_providers::{BackendDescriptor, UserInfo};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Number of embedding values shown before eliding.
const EMBEDDING_PREVIEW: usize = 5;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Formats executor status and tuning.
    pub fn format_status(&self, status: &ExecutorStatus, config: &ExecutorConfig) -> String {
        let mut lines = vec![self.format_backend_status("Primary", status.primary)];

        match status.fallback {
            Some(fallback) => lines.push(self.format_backend_status("Fallback", fallback)),
            None => lines.push(format!("{:<9} {}", "Fallback:", self.dim("disabled"))),
        }

        let timeout = if config.timeout_ms == 0 {
            "none".to_string()
        } else {
            format!("{}ms", config.timeout_ms)
        };
        lines.push(self.dim(&format!(
            "Attempts: {}  Backoff: {}ms  Timeout: {}",
            config.max_retries, config.retry_delay_ms, timeout
        )));

        lines.join("\n")
    }

    fn format_backend_status(&self, label: &str, status: BackendStatus) -> String {
        let indicator = if status.available {
            self.green("✓ ready")
        } else {
            self.red("✗ unavailable")
        };
        format!(
            "{:<9} {:<8} {}",
            format!("{label}:"),
            status.identity.display_name(),
            indicator
        )
    }

    // ------------------------------------------------------------------------
    // Backends
    // ------------------------------------------------------------------------

    /// Formats the backend list header.
    pub fn format_backends_header(&self) -> String {
        self.bold(&format!(
            "{:<10} {:<8} {:<22} {}",
            "Backend", "CLI", "Default model", "Status"
        ))
    }

    /// Formats one backend line.
    pub fn format_backend_line(
        &self,
        desc: &BackendDescriptor,
        model: &str,
        signed_in: bool,
        primary: bool,
    ) -> String {
        let status = if signed_in {
            self.green("signed in")
        } else {
            self.dim("signed out")
        };
        let marker = if primary { " (primary)" } else { "" };

        format!(
            "{:<10} {:<8} {:<22} {}{}",
            desc.display_name(),
            desc.cli_name(),
            model,
            status,
            marker
        )
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    /// Formats a signed-in identity.
    pub fn format_user(&self, backend: BackendKind, user: &UserInfo) -> String {
        let mut lines = vec![self.bold(backend.display_name())];
        if let Some(email) = &user.email {
            lines.push(format!("Account: {}", self.cyan(email)));
        }
        if let Some(name) = &user.name {
            lines.push(format!("Name:    {name}"));
        }
        if let Some(id) = &user.id {
            lines.push(format!("ID:      {}", self.dim(id)));
        }
        lines.join("\n")
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// Formats a complete response: text followed by a usage line.
    pub fn format_response(&self, response: &GenerateContentResponse) -> String {
        let text = response.text().unwrap_or_default();
        format!("{text}\n{}", self.format_usage(&response.usage_metadata))
    }

    /// Formats token usage.
    pub fn format_usage(&self, usage: &UsageMetadata) -> String {
        self.dim(&format!(
            "[tokens: {} prompt + {} output = {}]",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        ))
    }

    /// Formats a token count.
    pub fn format_count(&self, total: u32) -> String {
        format!("{} tokens", self.bold(&total.to_string()))
    }

    /// Formats an embedding as its dimension plus a preview.
    pub fn format_embedding(&self, response: &EmbedContentResponse) -> String {
        let values = response.first().unwrap_or_default();
        let preview: Vec<String> = values
            .iter()
            .take(EMBEDDING_PREVIEW)
            .map(|v| format!("{v:.4}"))
            .collect();
        let ellipsis = if values.len() > EMBEDDING_PREVIEW { ", …" } else { "" };

        format!(
            "{} dimensions\n[{}{}]",
            self.bold(&values.len().to_string()),
            preview.join(", "),
            ellipsis
        )
    }

    // ------------------------------------------------------------------------
    // Color helpers
    // ------------------------------------------------------------------------

    fn paint(&self, color: &str, s: &str) -> String {
        if self.use_colors {
            format!("{color}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    pub(crate) fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }
}
