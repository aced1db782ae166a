//! Generator factory backed by user settings.
//!
//! Resolves each backend's descriptor, overlays the user's per-backend
//! settings, and wires an [`OAuth2Client`] with its credential store into
//! the backend's generator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use tandem_core::BackendKind;
use tandem_fetch::{ContentGenerator, GenerateError, GeneratorFactory, HttpClient};
use tandem_store::{CredentialStore, Settings, default_config_dir};

use crate::descriptor::BackendDescriptor;
use crate::oauth::OAuth2Client;
use crate::registry::BackendRegistry;

/// Builds generators from [`Settings`] and the backend registry.
pub struct DefaultGeneratorFactory {
    settings: Settings,
    config_root: PathBuf,
    http: HttpClient,
}

impl DefaultGeneratorFactory {
    /// Creates a factory storing credentials under the default config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: Settings) -> Result<Self, GenerateError> {
        Ok(Self {
            settings,
            config_root: default_config_dir(),
            http: HttpClient::new()?,
        })
    }

    /// Stores credentials under a different root.
    #[must_use]
    pub fn with_config_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config_root = root.into();
        self
    }

    /// Returns the settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the credential root.
    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    fn descriptor(kind: BackendKind) -> Result<&'static BackendDescriptor, GenerateError> {
        BackendRegistry::get(kind)
            .ok_or_else(|| GenerateError::Config(format!("No descriptor for backend {kind}")))
    }

    /// Builds the OAuth client for a backend.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] if no client ID is configured.
    pub fn oauth_client(&self, kind: BackendKind) -> Result<OAuth2Client, GenerateError> {
        let desc = Self::descriptor(kind)?;
        let overrides = self.settings.backend(kind);

        let config = desc.oauth_config(&overrides).ok_or_else(|| {
            GenerateError::Config(format!(
                "No OAuth client ID configured for {}; set {}_CLIENT_ID",
                desc.display_name(),
                kind.env_prefix()
            ))
        })?;

        Ok(OAuth2Client::new(
            kind,
            config,
            CredentialStore::under(&self.config_root, kind),
            self.http.clone(),
        ))
    }

    /// Returns the generation model for a backend.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] for an unregistered backend.
    pub fn model_for(&self, kind: BackendKind) -> Result<String, GenerateError> {
        Ok(Self::descriptor(kind)?.model(&self.settings.backend(kind)))
    }

    /// Returns the embedding model for a backend.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] for an unregistered backend.
    pub fn embedding_model_for(&self, kind: BackendKind) -> Result<String, GenerateError> {
        Ok(Self::descriptor(kind)?.embedding_model(&self.settings.backend(kind)))
    }
}

#[async_trait]
impl GeneratorFactory for DefaultGeneratorFactory {
    /// Builds a generator from configuration alone.
    ///
    /// Only a missing or invalid configuration fails here. Credentials are
    /// resolved per call, so a missing login or a failed refresh counts as a
    /// failed attempt.
    #[instrument(skip(self), fields(backend = %kind))]
    async fn create(&self, kind: BackendKind) -> Result<Arc<dyn ContentGenerator>, GenerateError> {
        let desc = Self::descriptor(kind)?;
        let client = Arc::new(self.oauth_client(kind)?);
        debug!(client_id = %client.config().client_id, "OAuth client configured");

        let base_url = desc.base_url(&self.settings.backend(kind));
        info!(base_url = %base_url, "Generator ready");

        Ok(desc.build_generator(client, self.http.clone(), base_url))
    }
}

// ============================================================================
// Tests
// ============================================================================
