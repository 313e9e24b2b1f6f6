//! The string-keyed persistence capability.
//!
//! The daily counter only needs `get`/`set` by key. Backends:
//!
//! - [`FileKeyValueStore`] - one file per key in a directory
//! - [`MemoryKeyValueStore`] - process-local map, with failure injection

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::write_atomic;

// ============================================================================
// Key Value Store Trait
// ============================================================================

/// Asynchronous string-keyed storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Value found
    /// * `Ok(None)` - No value under `key`
    /// * `Err(e)` - The backend failed
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ============================================================================
// File Backend
// ============================================================================

/// Stores each key as a file inside a directory.
///
/// Keys are mapped to file names by replacing anything outside
/// `[A-Za-z0-9._-]` with `_` and trimming leading/trailing `_` and `.`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }
}

fn file_name_for(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "_.json".to_string()
    } else {
        format!("{trimmed}.json")
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(key = %key, path = %path.display(), "Value read");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key = %key, path = %path.display(), "No value stored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        write_atomic(&self.path_for(key), value).await
    }
}

// ============================================================================
// Memory Backend
// ============================================================================

/// In-memory store.
///
/// Reads and writes can be made to fail on demand to exercise degradation
/// paths.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Reads a value without going through failure injection.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("read of {key} refused")));
        }
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("write of {key} refused")));
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_sanitizing() {
        assert_eq!(file_name_for("@pedometer_step_data"), "pedometer_step_data.json");
        assert_eq!(file_name_for("a/b\\c"), "a_b_c.json");
        assert_eq!(file_name_for("../../etc/passwd"), "etc_passwd.json");
        assert_eq!(file_name_for("@@@"), "_.json");
    }

    #[tokio::test]
    async fn test_memory_get_set() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_failure_injection() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "v").await.unwrap();

        store.set_fail_reads(true);
        assert!(store.get("k").await.is_err());
        assert_eq!(store.peek("k").await, Some("v".to_string()));

        store.set_fail_writes(true);
        assert!(store.set("k", "w").await.is_err());
        assert_eq!(store.peek("k").await, Some("v".to_string()));
        assert_eq!(store.write_count(), 1);
    }
}
