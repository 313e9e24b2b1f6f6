//! Daily goal and progress.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default daily goal.
pub const DEFAULT_STEP_GOAL: u64 = 10_000;

/// A daily step goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepGoal(pub u64);

impl StepGoal {
    /// Progress of `steps` toward this goal.
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn progress(self, steps: u64) -> GoalProgress {
        let fraction = if self.0 == 0 {
            1.0
        } else {
            steps as f64 / self.0 as f64
        };
        let percent = (fraction * 100.0).round().clamp(0.0, 100.0) as u8;
        GoalProgress {
            steps,
            goal: self.0,
            fraction,
            percent,
        }
    }
}

impl Default for StepGoal {
    fn default() -> Self {
        StepGoal(DEFAULT_STEP_GOAL)
    }
}

impl fmt::Display for StepGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress toward a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Steps counted.
    pub steps: u64,
    /// Goal.
    pub goal: u64,
    /// `steps / goal`, not capped.
    pub fraction: f64,
    /// Rounded percentage, capped at 100.
    pub percent: u8,
}

impl GoalProgress {
    /// Returns true once the goal is met.
    pub fn is_complete(&self) -> bool {
        self.steps >= self.goal
    }

    /// Steps still needed, zero once complete.
    pub fn remaining(&self) -> u64 {
        self.goal.saturating_sub(self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_rounds() {
        let progress = StepGoal::default().progress(1_234);
        assert_eq!(progress.percent, 12);
        assert_eq!(progress.remaining(), 8_766);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_progress_caps_percent_not_fraction() {
        let progress = StepGoal(1_000).progress(2_500);
        assert_eq!(progress.percent, 100);
        assert!((progress.fraction - 2.5).abs() < f64::EPSILON);
        assert!(progress.is_complete());
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn test_zero_goal_is_complete() {
        let progress = StepGoal(0).progress(0);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_near_goal_rounds_to_hundred() {
        assert_eq!(StepGoal::default().progress(9_960).percent, 100);
        assert_eq!(StepGoal::default().progress(9_940).percent, 99);
    }
}
