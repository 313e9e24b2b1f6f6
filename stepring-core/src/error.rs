//! Core error types for Stepring.

use thiserror::Error;

/// Core error type for model-level operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted value could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Errors reported by a [`StepSensor`](crate::StepSensor) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The requested operation is not supported on this device.
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// The sensor service is not reachable.
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),

    /// The sensor reported a failure.
    #[error("Sensor failure: {0}")]
    Failed(String),
}

impl SensorError {
    /// Returns true if the operation is simply not supported by the device.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SensorError::Unsupported(_))
    }
}

/// Failure categories of a tracking session.
///
/// Terminal variants end the session in the Unavailable state; the rest are
/// absorbed and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Sensor not present or not supported on this device.
    #[error("Pedometer not available on this device")]
    CapabilityUnavailable,

    /// The user declined sensor access.
    #[error("Permission to access pedometer was denied")]
    PermissionDenied,

    /// The same-day authoritative query failed or is unsupported.
    #[error("Historical step data not available: {0}")]
    HistoricalQueryUnsupported(String),

    /// Reading or writing the persisted record failed.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Anything unexpected during synchronization.
    #[error("Failed to initialize pedometer")]
    InitializationFailure(String),
}

impl TrackerError {
    /// Returns true if this error ends the session in the Unavailable state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrackerError::CapabilityUnavailable
                | TrackerError::PermissionDenied
                | TrackerError::InitializationFailure(_)
        )
    }
}
