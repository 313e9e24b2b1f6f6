//! Serde tests for the persisted and published types.
//!
//! The record format is shared with existing installs, so field names and
//! the date format are pinned here.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::{DailyStepRecord, StepSnapshot, TrackerStatus};

fn sample_record() -> DailyStepRecord {
    DailyStepRecord::new(
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        4_321,
        Utc.with_ymd_and_hms(2024, 3, 14, 18, 30, 5).unwrap(),
    )
}

// ============================================================================
// DailyStepRecord
// ============================================================================

#[test]
fn test_record_field_names() {
    let value: serde_json::Value = serde_json::to_value(sample_record()).unwrap();
    assert_eq!(value["date"], "2024-03-14");
    assert_eq!(value["steps"], 4_321);
    assert!(value["lastUpdated"].is_string());
    assert!(value.get("last_updated").is_none());
}

#[test]
fn test_record_roundtrip_is_exact() {
    let record = sample_record();
    let json = record.to_json().unwrap();
    let parsed = DailyStepRecord::from_json(&json).unwrap();
    assert_eq!(parsed, record);
    assert_eq!(parsed.to_json().unwrap(), json);
}

#[test]
fn test_record_roundtrip_keeps_subsecond_timestamp() {
    let mut record = sample_record();
    record.last_updated = DateTime::parse_from_rfc3339("2024-03-14T18:30:05.123Z")
        .unwrap()
        .with_timezone(&Utc);
    let parsed = DailyStepRecord::from_json(&record.to_json().unwrap()).unwrap();
    assert_eq!(parsed.last_updated, record.last_updated);
}

#[test]
fn test_record_parses_millisecond_iso_timestamp() {
    let raw = r#"{"date":"2024-03-14","steps":42,"lastUpdated":"2024-03-14T10:15:30.123Z"}"#;
    let record = DailyStepRecord::from_json(raw).unwrap();
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    assert_eq!(record.steps, 42);
}

#[test]
fn test_record_rejects_negative_steps() {
    let raw = r#"{"date":"2024-03-14","steps":-5,"lastUpdated":"2024-03-14T10:15:30Z"}"#;
    assert!(DailyStepRecord::from_json(raw).is_err());
}

#[test]
fn test_record_rejects_bad_date() {
    let raw = r#"{"date":"14/03/2024","steps":5,"lastUpdated":"2024-03-14T10:15:30Z"}"#;
    assert!(DailyStepRecord::from_json(raw).is_err());
}

#[test]
fn test_record_rejects_garbage() {
    assert!(DailyStepRecord::from_json("not json").is_err());
    assert!(DailyStepRecord::from_json("").is_err());
}

// ============================================================================
// StepSnapshot
// ============================================================================

#[test]
fn test_snapshot_camel_case() {
    let value = serde_json::to_value(StepSnapshot::tracking(12)).unwrap();
    assert_eq!(value["steps"], 12);
    assert_eq!(value["isAvailable"], true);
    assert_eq!(value["isPending"], false);
    assert!(value["error"].is_null());
}

#[test]
fn test_tracker_status_tagged() {
    let value = serde_json::to_value(TrackerStatus::Unavailable("nope".into())).unwrap();
    assert_eq!(value["state"], "unavailable");
    assert_eq!(value["reason"], "nope");

    let value = serde_json::to_value(TrackerStatus::Tracking).unwrap();
    assert_eq!(value["state"], "tracking");
}
