//! Application lifecycle signal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;

/// Foreground/background transitions reported by the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppLifecycle {
    /// The app became active.
    Foreground,
    /// The app moved to the background.
    Background,
    /// Transient state between the two (e.g. a system overlay). Ignored.
    Inactive,
}

impl fmt::Display for AppLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppLifecycle::Foreground => write!(f, "foreground"),
            AppLifecycle::Background => write!(f, "background"),
            AppLifecycle::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for AppLifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foreground" | "active" | "fg" => Ok(AppLifecycle::Foreground),
            "background" | "bg" => Ok(AppLifecycle::Background),
            "inactive" => Ok(AppLifecycle::Inactive),
            other => Err(format!("unknown lifecycle state: {other}")),
        }
    }
}

/// Broadcast source of lifecycle transitions.
#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    sender: broadcast::Sender<AppLifecycle>,
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSignal {
    /// Creates a signal with room for a burst of queued transitions.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Emits a transition. Returns the number of listeners it reached.
    pub fn emit(&self, state: AppLifecycle) -> usize {
        self.sender.send(state).unwrap_or(0)
    }

    /// Registers a listener.
    pub fn listen(&self) -> broadcast::Receiver<AppLifecycle> {
        self.sender.subscribe()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
