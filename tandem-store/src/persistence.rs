//! File persistence helpers.
//!
//! Handles loading and saving state to disk with proper security. Every
//! write goes through a temp file plus rename so a crash never leaves a
//! truncated credential file behind.

use serde::{Serialize, de::DeserializeOwned};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/tandem`
/// - Linux: `~/.config/tandem`
/// - Windows: `%APPDATA%\tandem`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("tandem"))
        .unwrap_or_else(|| PathBuf::from(".tandem"))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets restrictive file permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets restrictive directory permissions (0o700) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Returns the sibling temp path used for atomic writes.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("tandem"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes bytes atomically with owner-only permissions.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, bytes).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Saves data to a JSON file with secure permissions.
///
/// Creates parent directories if they don't exist, writes atomically
/// (via temp file + rename), and sets restrictive permissions on Unix.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, json.as_bytes()).await?;

    debug!(path = %path.display(), "JSON file saved securely");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

/// Loads data from a JSON file, returning default if not found.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !e.is_not_found() {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

/// Saves a single-line text value with secure permissions.
pub async fn save_text(path: &Path, value: &str) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving text file");
    write_atomic(path, value.as_bytes()).await
}

/// Loads a trimmed text value. Missing or blank files yield `None`.
pub async fn load_text(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let trimmed = content.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Removes a file, treating "already gone" as success.
///
/// Returns true if a file was actually removed.
pub async fn remove_if_exists(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed file");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Ensures a directory exists with secure permissions.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await? {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path).await?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
