//! Domain models for Stepring.
//!
//! ## Submodules
//!
//! - [`record`] - The persisted daily record
//! - [`session`] - Sensor events and the tracker's published state
//! - [`goal`] - Daily goal and progress

mod goal;
mod record;
mod session;

pub use goal::{GoalProgress, StepGoal};
pub use record::DailyStepRecord;
pub use session::{StepEvent, StepSnapshot, TrackerStatus};
#[cfg(test)]
mod serde_tests;
