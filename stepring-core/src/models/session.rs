//! Sensor events and the tracker's published state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::goal::{GoalProgress, StepGoal};

// ============================================================================
// Step Event
// ============================================================================

/// A live sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Steps observed since the subscription began.
    pub steps: u64,
}

impl StepEvent {
    /// Creates an event.
    pub fn new(steps: u64) -> Self {
        Self { steps }
    }
}

// ============================================================================
// Step Snapshot
// ============================================================================

/// The tracker's published state, read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    /// Current total for today.
    pub steps: u64,
    /// False once the session has ended in the Unavailable state.
    pub is_available: bool,
    /// True while a synchronization is in flight.
    pub is_pending: bool,
    /// Human-readable reason when unavailable.
    pub error: Option<String>,
}

impl StepSnapshot {
    /// Synchronization in flight.
    pub fn pending(steps: u64) -> Self {
        Self {
            steps,
            is_available: true,
            is_pending: true,
            error: None,
        }
    }

    /// Live subscription active.
    pub fn tracking(steps: u64) -> Self {
        Self {
            steps,
            is_available: true,
            is_pending: false,
            error: None,
        }
    }

    /// Session ended on a device that supports step counting; `reason` is
    /// shown to the user.
    pub fn errored(steps: u64, reason: impl Into<String>) -> Self {
        Self {
            steps,
            is_available: true,
            is_pending: false,
            error: Some(reason.into()),
        }
    }

    /// Session ended because the device cannot count steps.
    pub fn unavailable(steps: u64, reason: impl Into<String>) -> Self {
        Self {
            steps,
            is_available: false,
            is_pending: false,
            error: Some(reason.into()),
        }
    }

    /// Collapses the flags into a single status.
    pub fn status(&self) -> TrackerStatus {
        if !self.is_available || self.error.is_some() {
            TrackerStatus::Unavailable(
                self.error
                    .clone()
                    .unwrap_or_else(|| "Pedometer not available on this device".to_string()),
            )
        } else if self.is_pending {
            TrackerStatus::Pending
        } else {
            TrackerStatus::Tracking
        }
    }

    /// Progress toward `goal`.
    pub fn progress(&self, goal: StepGoal) -> GoalProgress {
        goal.progress(self.steps)
    }
}

impl Default for StepSnapshot {
    fn default() -> Self {
        Self::pending(0)
    }
}

// ============================================================================
// Tracker Status
// ============================================================================

/// Coarse tracker state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum TrackerStatus {
    /// Checks and baseline load in flight.
    Pending,
    /// Live subscription active.
    Tracking,
    /// Session ended.
    Unavailable(String),
}

impl TrackerStatus {
    /// Returns true for [`TrackerStatus::Tracking`].
    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackerStatus::Tracking)
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerStatus::Pending => write!(f, "pending"),
            TrackerStatus::Tracking => write!(f, "tracking"),
            TrackerStatus::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}
