// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Stepring Core
//!
//! Core types, models, and capability traits for Stepring.
//!
//! This crate provides the foundational abstractions used across all other
//! Stepring crates, including:
//!
//! - Domain models (daily step record, sensor events, published state)
//! - Error types
//! - Capability traits for the motion sensor and the wall clock
//!
//! ## Key Types
//!
//! ### Records
//! - [`DailyStepRecord`] - The single persisted "today's steps" record
//! - [`StepEvent`] - A live sensor event (cumulative since subscription start)
//!
//! ### Published State
//! - [`StepSnapshot`] - What the presentation layer reads
//! - [`TrackerStatus`] - Pending / Tracking / Unavailable view of a snapshot
//! - [`StepGoal`] and [`GoalProgress`] - Progress toward the daily goal
//!
//! ### Capabilities
//! - [`StepSensor`] - Motion sensor contract
//! - [`Clock`] - Mockable source of "now" and "today"

pub mod clock;
pub mod error;
pub mod models;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, SensorError, TrackerError};
pub use models::{DailyStepRecord, GoalProgress, StepEvent, StepGoal, StepSnapshot, TrackerStatus};
pub use traits::{PermissionStatus, SensorSubscription, StepSensor, SubscriptionId};
