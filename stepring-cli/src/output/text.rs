//! Text output formatting with progress bars and colors.

use std::path::Path;

use stepring_core::{DailyStepRecord, GoalProgress, StepSnapshot, TrackerStatus};
use stepring_store::Settings;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats today's record with goal progress.
    pub fn format_today(&self, record: &DailyStepRecord, progress: &GoalProgress) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold(&format!("Today ({})", record.date.format("%Y-%m-%d"))));
        lines.push("─".repeat(40));
        lines.push(format!(
            "Steps:    {} / {}",
            self.cyan(&format_number(record.steps)),
            format_number(progress.goal)
        ));
        lines.push(format!(
            "Progress: {} {}",
            self.progress_bar(progress.percent),
            self.color_for_percent(progress.percent, &format!("{}%", progress.percent))
        ));
        if progress.is_complete() {
            lines.push(self.green("Goal reached!"));
        } else {
            lines.push(format!("Remaining: {}", format_number(progress.remaining())));
        }
        let updated = record.last_updated.with_timezone(&chrono::Local);
        lines.push(self.dim(&format!("Updated {}", updated.format("%Y-%m-%d %H:%M:%S"))));

        lines.join("\n")
    }

    /// Formats one published tracker state as a single line.
    pub fn format_snapshot(
        &self,
        label: &str,
        snapshot: &StepSnapshot,
        progress: &GoalProgress,
    ) -> String {
        let (state, color) = match snapshot.status() {
            TrackerStatus::Pending => ("pending", DIM),
            TrackerStatus::Tracking => ("tracking", GREEN),
            TrackerStatus::Unavailable(_) => ("unavailable", RED),
        };

        let mut line = format!(
            "{:<16} {} {:>8} steps {:>4}",
            label,
            self.paint(color, &format!("{state:<11}")),
            format_number(snapshot.steps),
            format!("{}%", progress.percent),
        );
        if let Some(error) = &snapshot.error {
            line.push_str(&format!("  {}", self.dim(error)));
        }
        line
    }

    /// Formats settings for `config show`.
    pub fn format_settings(&self, settings: &Settings, path: &Path, data_dir: &Path) -> String {
        let persist = if settings.persist_every == 0 {
            "on background only".to_string()
        } else {
            format!("every {} sensor steps", settings.persist_every)
        };

        [
            self.bold("Stepring Configuration"),
            "─".repeat(40),
            String::new(),
            format!("Daily goal:   {}", format_number(settings.step_goal.0)),
            format!("Persist:      {persist}"),
            format!("Storage key:  {}", settings.storage_key),
            format!("Data dir:     {}", data_dir.display()),
            format!("Log level:    {}", settings.log_level),
            String::new(),
            self.dim(&format!("Loaded from {}", path.display())),
        ]
        .join("\n")
    }

    /// Formats a progress bar for a completion percentage.
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn progress_bar(&self, percent: u8) -> String {
        let filled = ((f64::from(percent) / 100.0) * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);
        let empty = self.bar_width - filled;

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent, &bar)
    }

    // ========================================================================
    // Color helpers
    // ========================================================================

    fn color_for_percent(&self, percent: u8, text: &str) -> String {
        if percent >= 100 {
            self.green(text)
        } else if percent >= 50 {
            self.yellow(text)
        } else {
            text.to_string()
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Formats a count with thousands separators.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
