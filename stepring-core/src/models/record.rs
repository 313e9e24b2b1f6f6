//! The persisted daily step record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Steps attributed to one local calendar day.
///
/// Only one record is ever persisted; it represents "today" or is stale and
/// gets superseded by the next day's record under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStepRecord {
    /// Local day the steps belong to, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Total steps for `date`.
    pub steps: u64,
    /// Time of the last write. Informational only.
    pub last_updated: DateTime<Utc>,
}

impl DailyStepRecord {
    /// Creates a record.
    pub fn new(date: NaiveDate, steps: u64, last_updated: DateTime<Utc>) -> Self {
        Self {
            date,
            steps,
            last_updated,
        }
    }

    /// Creates a zeroed record for `date`.
    pub fn fresh(date: NaiveDate, last_updated: DateTime<Utc>) -> Self {
        Self::new(date, 0, last_updated)
    }

    /// Returns true if this record belongs to `date`.
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    /// Serializes to the storage representation.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the storage representation.
    ///
    /// # Errors
    ///
    /// Returns error if `raw` is not a valid record.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}
