//! The daily step counter.
//!
//! Persists a single [`DailyStepRecord`] under a fixed key and owns the
//! day-rollover decision. Storage failures never reach callers: a failed
//! read counts as "no record", a failed write is logged and dropped.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use stepring_core::{Clock, DailyStepRecord};
use tracing::{debug, info, warn};

use crate::backend::KeyValueStore;
use crate::error::StoreError;

/// Default storage key for the daily record.
pub const STORAGE_KEY: &str = "@pedometer_step_data";

/// Durable "today's step total".
#[derive(Clone)]
pub struct DailyCounterStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
}

impl DailyCounterStore {
    /// Creates a store under the default key.
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_key(backend, clock, STORAGE_KEY)
    }

    /// Creates a store under a custom key.
    pub fn with_key(
        backend: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            clock,
            key: key.into(),
        }
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Clock used for day decisions.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Reads the persisted record as-is, whatever day it belongs to.
    ///
    /// Read failures and undecodable values are logged and reported as `None`.
    pub async fn load(&self) -> Option<DailyStepRecord> {
        match self.try_load().await {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load step record, treating as absent");
                None
            }
        }
    }

    async fn try_load(&self) -> Result<Option<DailyStepRecord>, StoreError> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            return Ok(None);
        };
        Ok(Some(DailyStepRecord::from_json(&raw)?))
    }

    /// Returns today's record, starting a fresh zeroed one if the stored
    /// record is missing or belongs to another day.
    pub async fn get_or_init_today(&self) -> DailyStepRecord {
        let today = self.clock.today();

        match self.load().await {
            Some(record) if record.is_for(today) => {
                debug!(date = %today, steps = record.steps, "Loaded today's step record");
                record
            }
            previous => {
                match previous {
                    Some(old) => info!(
                        previous = %old.date,
                        previous_steps = old.steps,
                        today = %today,
                        "Day rolled over, starting a new step record"
                    ),
                    None => info!(today = %today, "No step record found, starting a new one"),
                }
                let fresh = DailyStepRecord::fresh(today, self.clock.now().with_timezone(&Utc));
                self.save(&fresh).await;
                fresh
            }
        }
    }

    /// Overwrites the record with `steps` for the day current at call time.
    pub async fn set_today(&self, steps: u64) {
        let today = self.clock.today();
        self.set_for(today, steps).await;
    }

    /// Overwrites the record with `steps` for an explicit day.
    pub async fn set_for(&self, date: NaiveDate, steps: u64) {
        let record = DailyStepRecord::new(date, steps, self.clock.now().with_timezone(&Utc));
        self.save(&record).await;
    }

    async fn save(&self, record: &DailyStepRecord) {
        let result = match record.to_json() {
            Ok(json) => self.backend.set(&self.key, &json).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                debug!(key = %self.key, date = %record.date, steps = record.steps, "Step record saved");
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    date = %record.date,
                    steps = record.steps,
                    error = %e,
                    "Failed to save step record, keeping in-memory total"
                );
            }
        }
    }
}

impl std::fmt::Debug for DailyCounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyCounterStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryKeyValueStore;
    use chrono::{Duration, NaiveDateTime};
    use stepring_core::ManualClock;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Arc<MemoryKeyValueStore>, Arc<ManualClock>, DailyCounterStore) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::from_naive(at(2024, 3, 14, 9)));
        let store = DailyCounterStore::new(backend.clone(), clock.clone());
        (backend, clock, store)
    }

    async fn seed(backend: &MemoryKeyValueStore, record: &DailyStepRecord) {
        backend
            .set(STORAGE_KEY, &record.to_json().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_init_when_absent() {
        let (backend, _clock, store) = setup();

        let record = store.get_or_init_today().await;

        assert_eq!(record.date, date(2024, 3, 14));
        assert_eq!(record.steps, 0);
        assert_eq!(store.load().await, Some(record));
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_rollover_resets_yesterday() {
        let (backend, _clock, store) = setup();
        seed(
            &backend,
            &DailyStepRecord::new(date(2024, 3, 13), 9_000, Utc::now()),
        )
        .await;

        let record = store.get_or_init_today().await;

        assert_eq!(record.date, date(2024, 3, 14));
        assert_eq!(record.steps, 0);
        let persisted = store.load().await.unwrap();
        assert_eq!(persisted.date, date(2024, 3, 14));
        assert_eq!(persisted.steps, 0);
    }

    #[tokio::test]
    async fn test_same_day_read_is_idempotent() {
        let (backend, _clock, store) = setup();
        let seeded = DailyStepRecord::new(date(2024, 3, 14), 812, Utc::now());
        seed(&backend, &seeded).await;
        let writes_before = backend.write_count();

        let first = store.get_or_init_today().await;
        let second = store.get_or_init_today().await;

        assert_eq!(first, seeded);
        assert_eq!(second, seeded);
        assert_eq!(backend.write_count(), writes_before);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reinitialized() {
        let (backend, _clock, store) = setup();
        backend.set(STORAGE_KEY, "{not json").await.unwrap();

        let record = store.get_or_init_today().await;

        assert_eq!(record.steps, 0);
        assert_eq!(store.load().await.unwrap().steps, 0);
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_zero() {
        let (backend, _clock, store) = setup();
        seed(
            &backend,
            &DailyStepRecord::new(date(2024, 3, 14), 500, Utc::now()),
        )
        .await;
        backend.set_fail_reads(true);

        let record = store.get_or_init_today().await;

        assert_eq!(record.steps, 0);
        assert_eq!(record.date, date(2024, 3, 14));
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let (backend, _clock, store) = setup();
        backend.set_fail_writes(true);

        store.set_today(42).await;
        let record = store.get_or_init_today().await;

        assert_eq!(record.steps, 0);
        assert_eq!(backend.peek(STORAGE_KEY).await, None);
    }

    #[tokio::test]
    async fn test_set_today_overwrites() {
        let (_backend, _clock, store) = setup();

        store.set_today(100).await;
        store.set_today(250).await;

        let record = store.get_or_init_today().await;
        assert_eq!(record.steps, 250);
    }

    #[tokio::test]
    async fn test_set_today_recomputes_date_at_call_time() {
        let (_backend, clock, store) = setup();
        store.set_today(100).await;

        clock.advance(Duration::days(1));
        store.set_today(300).await;

        let record = store.load().await.unwrap();
        assert_eq!(record.date, date(2024, 3, 15));
        assert_eq!(record.steps, 300);
    }

    #[tokio::test]
    async fn test_set_for_explicit_date() {
        let (_backend, clock, store) = setup();
        clock.advance(Duration::days(1));

        store.set_for(date(2024, 3, 14), 900).await;

        let record = store.load().await.unwrap();
        assert_eq!(record.date, date(2024, 3, 14));
        // A record for yesterday is stale today.
        assert_eq!(store.get_or_init_today().await.steps, 0);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::from_naive(at(2024, 3, 14, 9)));
        let store = DailyCounterStore::with_key(backend.clone(), clock, "custom");

        store.set_today(7).await;

        assert_eq!(store.key(), "custom");
        assert!(backend.peek("custom").await.is_some());
        assert!(backend.peek(STORAGE_KEY).await.is_none());
    }
}
