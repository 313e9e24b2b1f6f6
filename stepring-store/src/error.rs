//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] stepring_core::CoreError),

    /// The storage backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this error means the value was missing rather than broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
