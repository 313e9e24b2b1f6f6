//! Capability traits for Stepring.
//!
//! The motion sensor is an external collaborator. This module defines the
//! contract the tracker relies on; platform bindings and test doubles
//! implement it.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use crate::error::SensorError;
use crate::models::StepEvent;

// ============================================================================
// Permission
// ============================================================================

/// Result of a sensor permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Access granted.
    Granted,
    /// Access declined.
    Denied,
    /// The user has not answered yet.
    #[default]
    Undetermined,
}

impl PermissionStatus {
    /// Returns true only for [`PermissionStatus::Granted`].
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::Undetermined => write!(f, "undetermined"),
        }
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Identifier of a live sensor subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A live step-count subscription.
///
/// Events carry a count that is cumulative since the subscription began.
/// The stream ends when the sensor drops its sender.
#[derive(Debug)]
pub struct SensorSubscription {
    /// Handle to pass back to [`StepSensor::unsubscribe`].
    pub id: SubscriptionId,
    /// Event stream.
    pub events: mpsc::UnboundedReceiver<StepEvent>,
}

impl SensorSubscription {
    /// Creates a subscription from an id and a receiver.
    pub fn new(id: SubscriptionId, events: mpsc::UnboundedReceiver<StepEvent>) -> Self {
        Self { id, events }
    }
}

// ============================================================================
// Step Sensor
// ============================================================================

/// Contract of the device motion sensor.
///
/// ## Implementing a Sensor
///
/// ```ignore
/// struct PlatformPedometer;
///
/// #[async_trait]
/// impl StepSensor for PlatformPedometer {
///     async fn is_available(&self) -> Result<bool, SensorError> {
///         Ok(platform::pedometer_present())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait StepSensor: Send + Sync {
    /// Whether the device has a usable step counter.
    async fn is_available(&self) -> Result<bool, SensorError>;

    /// Asks the user for access to motion data.
    async fn request_permission(&self) -> Result<PermissionStatus, SensorError>;

    /// Total steps the sensor recorded between `start` and `end`.
    ///
    /// Devices without history return [`SensorError::Unsupported`].
    async fn query_range(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<u64, SensorError>;

    /// Opens a live subscription to incremental step events.
    async fn subscribe(&self) -> Result<SensorSubscription, SensorError>;

    /// Closes a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
