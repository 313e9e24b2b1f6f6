//! File persistence helpers.
//!
//! Handles loading and saving state to disk with proper security.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/Stepring`
/// - Linux: `~/.config/stepring`
/// - Windows: `%APPDATA%\stepring`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("Stepring"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("stepring"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default data directory for the step record.
///
/// - macOS: `~/Library/Application Support/Stepring/data`
/// - Linux: `~/.local/share/stepring`
/// - Windows: `%APPDATA%\stepring\data`
pub fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        default_config_dir().join("data")
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::data_dir()
            .map(|d| d.join("stepring"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
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
pub(crate) async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
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
pub(crate) async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
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

/// Ensures a directory exists, creating it owner-only if missing.
///
/// # Errors
///
/// Returns error if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path).await?;
    }
    Ok(())
}

/// Writes `contents` to `path` atomically.
///
/// Creates the parent directory if needed, writes a sibling temp file, then
/// renames it over the target and restricts its permissions on Unix.
///
/// # Errors
///
/// Returns error if any filesystem step fails.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent).await?;
        }
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, contents).await?;
    tokio::fs::rename(&temp_path, path).await?;
    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), bytes = contents.len(), "File written");
    Ok(())
}

/// Saves data to a pretty-printed JSON file.
///
/// # Errors
///
/// Returns error if serialization or the write fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json).await
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

// ============================================================================
// Tests
// ============================================================================
