//! Shared command setup: settings, factory, and backend selection.

use anyhow::{Result, anyhow};
use tandem_core::BackendKind;
use tandem_fetch::ResilientExecutor;
use tandem_providers::{BackendRegistry, DefaultGeneratorFactory};
use tandem_store::{Settings, SettingsStore};
use tracing::debug;

use crate::Cli;

/// Loaded settings plus the factory built from them.
pub struct AppContext {
    pub settings: Settings,
    pub factory: DefaultGeneratorFactory,
}

impl AppContext {
    /// Loads settings and applies command-line overrides.
    pub async fn load(cli: &Cli) -> Result<Self> {
        let store = match &cli.config {
            Some(path) => SettingsStore::load(path.clone()).await?,
            None => SettingsStore::load_default().await?,
        };
        let mut settings = store.get().await;

        if let Some(name) = &cli.backend {
            select_primary(&mut settings, resolve_backend(name)?);
        }

        let factory = DefaultGeneratorFactory::new(settings.clone())?;
        Ok(Self { settings, factory })
    }

    /// Returns the primary backend.
    pub fn primary(&self) -> BackendKind {
        self.settings.primary_backend
    }

    /// Resolves an optional backend name, defaulting to the primary.
    pub fn backend_or_primary(&self, name: Option<&str>) -> Result<BackendKind> {
        name.map_or(Ok(self.primary()), resolve_backend)
    }

    /// Builds the executor for the configured backends.
    pub async fn executor(&self) -> Result<ResilientExecutor> {
        Ok(ResilientExecutor::initialize(
            self.settings.primary_backend,
            self.settings.executor.clone(),
            &self.factory,
        )
        .await?)
    }
}

/// Resolves a CLI name or alias to a backend.
pub fn resolve_backend(name: &str) -> Result<BackendKind> {
    BackendRegistry::get_by_cli_name(name)
        .map(|d| d.id)
        .ok_or_else(|| anyhow!("Unknown backend: {name}"))
}

/// Makes `kind` the primary. If it was the fallback, the roles swap.
fn select_primary(settings: &mut Settings, kind: BackendKind) {
    let previous = settings.primary_backend;
    settings.primary_backend = kind;

    if settings.executor.fallback_backend == Some(kind) {
        settings.executor.fallback_backend = Some(previous);
        debug!(primary = %kind, fallback = %previous, "Swapped primary and fallback");
    }
}
