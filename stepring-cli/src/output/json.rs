//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use stepring_core::{DailyStepRecord, GoalProgress, StepSnapshot, TrackerStatus};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for `today`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayOutput {
    pub date: String,
    pub steps: u64,
    pub goal: u64,
    pub percent: u8,
    pub remaining: u64,
    pub complete: bool,
    #[serde(serialize_with = "serialize_datetime")]
    pub last_updated: DateTime<Utc>,
}

impl TodayOutput {
    /// Builds the output for a record and its progress.
    pub fn new(record: &DailyStepRecord, progress: &GoalProgress) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            steps: record.steps,
            goal: progress.goal,
            percent: progress.percent,
            remaining: progress.remaining(),
            complete: progress.is_complete(),
            last_updated: record.last_updated,
        }
    }
}

/// JSON output for one `track` step: the script line and the state it left.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub command: String,
    pub status: TrackerStatus,
    #[serde(flatten)]
    pub snapshot: StepSnapshot,
    pub percent: u8,
}

impl TrackOutput {
    /// Builds the output for a published snapshot.
    pub fn new(
        line: Option<usize>,
        command: impl Into<String>,
        snapshot: &StepSnapshot,
        progress: &GoalProgress,
    ) -> Self {
        Self {
            line,
            command: command.into(),
            status: snapshot.status(),
            snapshot: snapshot.clone(),
            percent: progress.percent,
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
