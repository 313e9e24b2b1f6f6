//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O, the file-backed key-value store, and settings round-trip.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use stepring_core::{DailyStepRecord, ManualClock, StepGoal};
use tempfile::TempDir;

use crate::backend::{FileKeyValueStore, KeyValueStore};
use crate::daily::{DailyCounterStore, STORAGE_KEY};
use crate::persistence::{ensure_dir, load_json, save_json};
use crate::settings::{LogLevel, Settings, SettingsStore};

fn clock_on(y: i32, m: u32, d: u32) -> Arc<ManualClock> {
    Arc::new(ManualClock::from_naive(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap(),
    ))
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let settings = Settings::default();
    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    let data = serde_json::json!({"key": "value"});

    let result = save_json(&nested_path, &data).await;
    assert!(result.is_ok());
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// File Key-Value Store Tests
// ============================================================================

#[tokio::test]
async fn test_file_store_missing_key_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path().join("data"));

    assert_eq!(store.get("anything").await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_set_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path().join("data"));

    store.set(STORAGE_KEY, "payload").await.unwrap();

    assert_eq!(store.get(STORAGE_KEY).await.unwrap(), Some("payload".to_string()));
    assert!(store.path_for(STORAGE_KEY).ends_with("pedometer_step_data.json"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_store_directory_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let store = FileKeyValueStore::new(&data_dir);

    store.set("k", "v").await.unwrap();

    let mode = std::fs::metadata(&data_dir).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o700);
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_store_read_error_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(temp_dir.path());
    // A directory where the value file should be makes the read fail.
    std::fs::create_dir(store.path_for("k")).unwrap();

    assert!(store.get("k").await.is_err());
}

// ============================================================================
// Daily Counter Store over Files
// ============================================================================

#[tokio::test]
async fn test_daily_record_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock_on(2024, 6, 2);

    {
        let backend = Arc::new(FileKeyValueStore::new(temp_dir.path()));
        let store = DailyCounterStore::new(backend, clock.clone());
        store.get_or_init_today().await;
        store.set_today(3_456).await;
    }

    let backend = Arc::new(FileKeyValueStore::new(temp_dir.path()));
    let store = DailyCounterStore::new(backend, clock);
    let record = store.get_or_init_today().await;

    assert_eq!(record.steps, 3_456);
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
}

#[tokio::test]
async fn test_daily_record_file_format() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FileKeyValueStore::new(temp_dir.path()));
    let store = DailyCounterStore::new(backend.clone(), clock_on(2024, 6, 2));

    store.set_today(77).await;

    let raw = std::fs::read_to_string(backend.path_for(STORAGE_KEY)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["date"], "2024-06-02");
    assert_eq!(value["steps"], 77);
    assert!(value["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_daily_record_written_by_other_writer_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FileKeyValueStore::new(temp_dir.path()));
    let record = DailyStepRecord::new(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), 10, Utc::now());
    backend
        .set(STORAGE_KEY, &record.to_json().unwrap())
        .await
        .unwrap();

    let store = DailyCounterStore::new(backend, clock_on(2024, 6, 2));
    assert_eq!(store.get_or_init_today().await, record);
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store
        .update(|s| {
            s.step_goal = StepGoal(12_500);
            s.persist_every = 5;
            s.storage_key = "steps".to_string();
            s.data_dir = Some(PathBuf::from("/var/lib/steps"));
            s.log_level = LogLevel::Debug;
        })
        .await;
    store.save().await.unwrap();

    let loaded = SettingsStore::load(file_path).await.unwrap().get().await;
    assert_eq!(loaded.step_goal, StepGoal(12_500));
    assert_eq!(loaded.persist_every, 5);
    assert_eq!(loaded.storage_key, "steps");
    assert_eq!(loaded.data_dir, Some(PathBuf::from("/var/lib/steps")));
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[tokio::test]
async fn test_settings_partial_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"step_goal": 6000}"#).await.unwrap();

    let loaded = SettingsStore::load(file_path).await.unwrap().get().await;
    assert_eq!(loaded.step_goal, StepGoal(6_000));
    assert_eq!(loaded.persist_every, 10);
    assert_eq!(loaded.storage_key, STORAGE_KEY);
}

#[tokio::test]
async fn test_settings_corrupt_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{{{{").await.unwrap();

    let loaded = SettingsStore::load(file_path).await.unwrap().get().await;
    assert_eq!(loaded, Settings::default());
}

#[tokio::test]
async fn test_settings_save_rejects_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    let store = SettingsStore::new(file_path.clone());
    store.update(|s| s.storage_key = String::new()).await;

    assert!(store.save().await.is_err());
    assert!(!file_path.exists());
}
