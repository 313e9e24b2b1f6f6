//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::{TextFormatter, format_number};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::path::Path;
    use stepring_core::{DailyStepRecord, StepGoal, StepSnapshot};
    use stepring_store::Settings;

    fn record(steps: u64) -> DailyStepRecord {
        DailyStepRecord::new(
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            steps,
            Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0), "░░░░░░░░░░");
    }

    #[test]
    fn test_progress_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(100), "██████████");
    }

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0, "░░░░░░░░░░"),
            (10, "█░░░░░░░░░"),
            (25, "███░░░░░░░"), // 2.5 rounds to 3 blocks
            (50, "█████░░░░░"),
            (99, "██████████"),
        ];

        for (percent, expected) in test_cases {
            assert_eq!(formatter.progress_bar(percent), expected, "Failed for {percent}%");
        }
    }

    #[test]
    fn test_progress_bar_with_colors() {
        let formatter = TextFormatter::new(true);

        // Complete - should be green
        assert!(formatter.progress_bar(100).contains("\x1b[32m"));

        // Past half - should be yellow
        assert!(formatter.progress_bar(60).contains("\x1b[33m"));

        // Below half - plain
        assert!(!formatter.progress_bar(20).contains("\x1b["));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(10_000), "10,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_today_in_progress() {
        let formatter = TextFormatter::new(false);
        let progress = StepGoal::default().progress(4_321);

        let output = formatter.format_today(&record(4_321), &progress);

        assert!(output.contains("Today (2024-03-14)"));
        assert!(output.contains("4,321 / 10,000"));
        assert!(output.contains("43%"));
        assert!(output.contains("Remaining: 5,679"));
    }

    #[test]
    fn test_format_today_goal_reached() {
        let formatter = TextFormatter::new(false);
        let progress = StepGoal(8_000).progress(12_000);

        let output = formatter.format_today(&record(12_000), &progress);

        assert!(output.contains("100%"));
        assert!(output.contains("Goal reached!"));
        assert!(!output.contains("Remaining"));
    }

    #[test]
    fn test_format_snapshot_states() {
        let formatter = TextFormatter::new(false);
        let goal = StepGoal::default();

        let tracking = formatter.format_snapshot(
            "steps 10",
            &StepSnapshot::tracking(510),
            &goal.progress(510),
        );
        assert!(tracking.starts_with("steps 10"));
        assert!(tracking.contains("tracking"));
        assert!(tracking.contains("510 steps"));
        assert!(tracking.contains("5%"));

        let denied = StepSnapshot::errored(40, "Permission to access pedometer was denied");
        let line = formatter.format_snapshot("activate", &denied, &goal.progress(40));
        assert!(line.contains("unavailable"));
        assert!(line.contains("Permission to access pedometer was denied"));
    }

    #[test]
    fn test_format_settings() {
        let formatter = TextFormatter::new(false);
        let settings = Settings {
            persist_every: 0,
            ..Settings::default()
        };

        let output = formatter.format_settings(
            &settings,
            Path::new("/tmp/settings.json"),
            Path::new("/tmp/data"),
        );

        assert!(output.contains("Daily goal:   10,000"));
        assert!(output.contains("on background only"));
        assert!(output.contains("@pedometer_step_data"));
        assert!(output.contains("/tmp/data"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{JsonFormatter, TodayOutput, TrackOutput};
    use chrono::{NaiveDate, TimeZone, Utc};
    use stepring_core::{DailyStepRecord, StepGoal, StepSnapshot};

    #[test]
    fn test_today_output_fields() {
        let record = DailyStepRecord::new(
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            9_960,
            Utc.with_ymd_and_hms(2024, 3, 14, 18, 0, 0).unwrap(),
        );
        let progress = StepGoal::default().progress(record.steps);

        let json = JsonFormatter::new(false)
            .format(&TodayOutput::new(&record, &progress))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["date"], "2024-03-14");
        assert_eq!(value["steps"], 9_960);
        assert_eq!(value["goal"], 10_000);
        assert_eq!(value["percent"], 100);
        assert_eq!(value["remaining"], 40);
        assert_eq!(value["complete"], false);
        assert_eq!(value["lastUpdated"], "2024-03-14T18:00:00+00:00");
    }

    #[test]
    fn test_track_output_flattens_snapshot() {
        let snapshot = StepSnapshot::unavailable(0, "Pedometer not available on this device");
        let progress = StepGoal::default().progress(0);
        let output = TrackOutput::new(Some(3), "foreground", &snapshot, &progress);

        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["line"], 3);
        assert_eq!(value["command"], "foreground");
        assert_eq!(value["isAvailable"], false);
        assert_eq!(value["isPending"], false);
        assert_eq!(value["error"], "Pedometer not available on this device");
        assert_eq!(value["status"]["state"], "unavailable");
    }

    #[test]
    fn test_track_output_omits_line_for_activation() {
        let snapshot = StepSnapshot::tracking(12);
        let progress = StepGoal::default().progress(12);
        let output = TrackOutput::new(None, "activate", &snapshot, &progress);

        let json = JsonFormatter::new(false).format(&output).unwrap();

        assert!(!json.contains("\"line\""));
        assert!(json.contains("\"steps\":12"));
    }

    #[test]
    fn test_pretty_output() {
        let formatter = JsonFormatter::new(true);
        let json = formatter.format(&serde_json::json!({"steps": 1})).unwrap();
        assert!(json.contains('\n'));
    }
}
