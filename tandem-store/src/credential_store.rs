//! Per-backend credential storage.
//!
//! Pure file I/O: no expiry checks, no refresh. Each backend identity gets
//! its own directory holding the OAuth credential cache and a plain-text
//! user identifier.

use std::path::{Path, PathBuf};
use tandem_core::{BackendKind, Credentials};
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{
    default_config_dir, load_json, load_text, remove_if_exists, save_json, save_text,
};

/// Credential cache file name.
pub const CREDENTIALS_FILE: &str = "oauth_creds.json";

/// Cached user identifier file name.
pub const USER_ID_FILE: &str = "user_id";

/// File-backed store for one backend identity.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Creates a store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store for a backend under the default config directory.
    pub fn for_backend(kind: BackendKind) -> Self {
        Self::under(&default_config_dir(), kind)
    }

    /// Creates a store for a backend under a custom root.
    pub fn under(root: &Path, kind: BackendKind) -> Self {
        Self::new(root.join(kind.cli_name()))
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the credential file path.
    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Returns the user identifier file path.
    pub fn user_id_path(&self) -> PathBuf {
        self.dir.join(USER_ID_FILE)
    }

    /// Loads cached credentials.
    ///
    /// Returns `Ok(None)` when no cache file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn load_credentials(&self) -> Result<Option<Credentials>, StoreError> {
        match load_json::<Credentials>(&self.credentials_path()).await {
            Ok(creds) => {
                debug!("Loaded cached credentials");
                Ok(Some(creds))
            }
            Err(e) if e.is_not_found() => {
                debug!("No cached credentials");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Persists credentials, replacing any previous cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self, creds), fields(dir = %self.dir.display()))]
    pub async fn save_credentials(&self, creds: &Credentials) -> Result<(), StoreError> {
        save_json(&self.credentials_path(), creds).await
    }

    /// Loads the cached user identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load_user_id(&self) -> Result<Option<String>, StoreError> {
        load_text(&self.user_id_path()).await
    }

    /// Persists the user identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_user_id(&self, user_id: &str) -> Result<(), StoreError> {
        save_text(&self.user_id_path(), user_id).await
    }

    /// Deletes both files. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<(), StoreError> {
        let creds_removed = remove_if_exists(&self.credentials_path()).await?;
        let user_removed = remove_if_exists(&self.user_id_path()).await?;
        debug!(creds_removed, user_removed, "Cleared credential store");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
