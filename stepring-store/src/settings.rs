//! User preferences store.
//!
//! Manages settings with persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use stepring_core::StepGoal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::daily::STORAGE_KEY;
use crate::error::StoreError;
use crate::persistence::{default_data_dir, load_json, save_json};

/// Default live-event throttle modulus.
pub const DEFAULT_PERSIST_EVERY: u64 = 10;

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily step goal.
    pub step_goal: StepGoal,

    /// Persist the live total whenever the sensor's own counter is a
    /// multiple of this. Zero disables throttled saves.
    pub persist_every: u64,

    /// Key the daily record is stored under.
    pub storage_key: String,

    /// Directory for the daily record (None = platform default).
    pub data_dir: Option<PathBuf>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_goal: StepGoal::default(),
            persist_every: DEFAULT_PERSIST_EVERY,
            storage_key: STORAGE_KEY.to_string(),
            data_dir: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Data directory, falling back to the platform default.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Checks values that would make tracking misbehave.
    ///
    /// # Errors
    ///
    /// Returns error if the storage key is empty.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.storage_key.trim().is_empty() {
            return Err(StoreError::Config("storage_key must not be empty".to_string()));
        }
        Ok(())
    }
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
// Settings Store
// ============================================================================

/// Persistent settings store.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults, backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from a path, using defaults if missing or unreadable.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Path the settings are saved to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory. Call [`save`](Self::save) to persist.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings are invalid or cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Sets the daily goal.
    pub async fn set_step_goal(&self, goal: StepGoal) {
        self.update(|s| s.step_goal = goal).await;
    }

    /// Sets the live-event throttle modulus.
    pub async fn set_persist_every(&self, every: u64) {
        self.update(|s| s.persist_every = every).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
