// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Stepring Store
//!
//! Persistence for Stepring.
//!
//! This crate provides:
//!
//! - **KeyValueStore**: The string-keyed persistence capability, with file and
//!   in-memory backends
//! - **DailyCounterStore**: The single "today's steps" record with day-rollover
//!   detection
//! - **SettingsStore**: User preferences with persistence
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use stepring_core::SystemClock;
//! use stepring_store::{DailyCounterStore, FileKeyValueStore};
//!
//! let backend = Arc::new(FileKeyValueStore::new(stepring_store::default_data_dir()));
//! let store = DailyCounterStore::new(backend, Arc::new(SystemClock));
//!
//! let today = store.get_or_init_today().await;
//! store.set_today(today.steps + 120).await;
//! ```

pub mod backend;
pub mod daily;
pub mod error;
pub mod persistence;
pub mod settings;

pub use backend::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use daily::{DailyCounterStore, STORAGE_KEY};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_data_dir, default_settings_path, load_json, save_json,
    write_atomic,
};
pub use settings::{LogLevel, Settings, SettingsStore};
#[cfg(test)]
mod persistence_tests;
