// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Stepring Tracker
//!
//! Live step tracking for Stepring.
//!
//! This crate provides:
//!
//! - **StepTracker**: Reconciles live sensor events with the persisted daily
//!   baseline and publishes the running total
//! - **Lifecycle**: Foreground/background signal the tracker reacts to
//! - **ChannelSensor**: A scriptable [`StepSensor`](stepring_core::StepSensor)
//!   for replays and tests
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use stepring_tracker::{LifecycleSignal, StepTracker, TrackerConfig};
//!
//! let tracker = StepTracker::new(sensor, store, TrackerConfig::default());
//! let lifecycle = LifecycleSignal::new();
//! tracker.attach_lifecycle(lifecycle.listen());
//! tracker.activate().await;
//!
//! let mut rx = tracker.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{} steps", rx.borrow().steps);
//! }
//! ```

pub mod config;
pub mod lifecycle;
pub mod sensor;
pub mod tracker;

pub use config::TrackerConfig;
pub use lifecycle::{AppLifecycle, LifecycleSignal};
pub use sensor::{ChannelSensor, SensorCalls};
pub use tracker::StepTracker;
