//! CLI command implementations.

pub mod config;
pub mod today;
pub mod track;

use std::path::PathBuf;
use std::sync::Arc;

use stepring_core::Clock;
use stepring_store::{DailyCounterStore, FileKeyValueStore, KeyValueStore, Settings};

use crate::Cli;

/// Directory holding the step record: `--data-dir`, then settings, then the
/// platform default.
pub fn data_dir(settings: &Settings, cli: &Cli) -> PathBuf {
    cli.data_dir
        .clone()
        .unwrap_or_else(|| settings.resolved_data_dir())
}

/// Opens the daily store on disk.
pub fn open_daily_store(
    settings: &Settings,
    cli: &Cli,
    clock: Arc<dyn Clock>,
) -> DailyCounterStore {
    let backend: Arc<dyn KeyValueStore> =
        Arc::new(FileKeyValueStore::new(data_dir(settings, cli)));
    DailyCounterStore::with_key(backend, clock, settings.storage_key.clone())
}
