//! Backend descriptor system.
//!
//! A descriptor contains all the static configuration for a backend:
//! - Metadata (display name, default models)
//! - Default endpoints (content API, OAuth)
//! - OAuth defaults (scopes, extra authorization parameters)
//! - CLI names
//! - How to build its generator

use std::sync::Arc;

use tandem_core::BackendKind;
use tandem_fetch::{ContentGenerator, HttpClient};
use tandem_store::BackendSettings;

use crate::oauth::{OAuth2Client, OAuthConfig};

/// Builds a generator from its OAuth client, HTTP client and base URL.
pub type GeneratorBuilder = fn(Arc<OAuth2Client>, HttpClient, String) -> Arc<dyn ContentGenerator>;

// ============================================================================
// Backend Descriptor
// ============================================================================

/// Complete descriptor for a backend.
pub struct BackendDescriptor {
    /// Backend identifier.
    pub id: BackendKind,
    /// Display metadata.
    pub metadata: BackendMetadata,
    /// Default endpoints.
    pub endpoints: Endpoints,
    /// OAuth defaults.
    pub oauth: OAuthDefaults,
    /// CLI names.
    pub cli: CliConfig,
    /// Generator constructor.
    pub build: GeneratorBuilder,
}

impl BackendDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &str {
        self.cli.name
    }

    /// Returns the content API base URL, honouring overrides.
    pub fn base_url(&self, overrides: &BackendSettings) -> String {
        pick(overrides.base_url.as_ref(), self.endpoints.base_url)
    }

    /// Returns the generation model, honouring overrides.
    pub fn model(&self, overrides: &BackendSettings) -> String {
        pick(overrides.model.as_ref(), self.metadata.default_model)
    }

    /// Returns the embedding model, honouring overrides.
    pub fn embedding_model(&self, overrides: &BackendSettings) -> String {
        pick(
            overrides.embedding_model.as_ref(),
            self.metadata.default_embedding_model,
        )
    }

    /// Builds the OAuth configuration. Returns `None` without a client ID.
    pub fn oauth_config(&self, overrides: &BackendSettings) -> Option<OAuthConfig> {
        let client_id = overrides.client_id.as_ref().filter(|id| !id.is_empty())?;

        let mut config = OAuthConfig::new(
            client_id.clone(),
            pick(overrides.auth_url.as_ref(), self.endpoints.auth_url),
            pick(overrides.token_url.as_ref(), self.endpoints.token_url),
            pick(overrides.userinfo_url.as_ref(), self.endpoints.userinfo_url),
        )
        .with_scopes(self.oauth.scopes.iter().copied())
        .with_redirects(
            self.oauth.success_url.map(str::to_string),
            self.oauth.failure_url.map(str::to_string),
        );

        for (key, value) in self.oauth.extra_auth_params {
            config = config.with_auth_param(*key, *value);
        }
        if let Some(secret) = overrides.client_secret.as_ref().filter(|s| !s.is_empty()) {
            config = config.with_client_secret(secret.clone());
        }

        Some(config)
    }

    /// Builds this backend's generator.
    pub fn build_generator(
        &self,
        auth: Arc<OAuth2Client>,
        http: HttpClient,
        base_url: String,
    ) -> Arc<dyn ContentGenerator> {
        (self.build)(auth, http, base_url)
    }
}

fn pick(value: Option<&String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

// ============================================================================
// Metadata
// ============================================================================

/// Display metadata and default models.
pub struct BackendMetadata {
    /// Human-readable name.
    pub display_name: &'static str,
    /// Default generation model.
    pub default_model: &'static str,
    /// Default embedding model.
    pub default_embedding_model: &'static str,
}

// ============================================================================
// Endpoints
// ============================================================================

/// Default endpoint URLs.
pub struct Endpoints {
    /// Content API base URL.
    pub base_url: &'static str,
    /// OAuth authorization endpoint.
    pub auth_url: &'static str,
    /// OAuth token endpoint.
    pub token_url: &'static str,
    /// User-info endpoint.
    pub userinfo_url: &'static str,
}

// ============================================================================
// OAuth Defaults
// ============================================================================

/// OAuth settings that do not vary per user.
pub struct OAuthDefaults {
    /// Requested scopes.
    pub scopes: &'static [&'static str],
    /// Extra authorization query parameters.
    pub extra_auth_params: &'static [(&'static str, &'static str)],
    /// Browser redirect after a successful login.
    pub success_url: Option<&'static str>,
    /// Browser redirect after a failed login.
    pub failure_url: Option<&'static str>,
}

// ============================================================================
// CLI Config
// ============================================================================

/// CLI naming.
pub struct CliConfig {
    /// Primary CLI name.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
}

// ============================================================================
// Tests
// ============================================================================
