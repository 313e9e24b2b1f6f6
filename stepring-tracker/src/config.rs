//! Tracker configuration.

use stepring_store::Settings;
use stepring_store::settings::DEFAULT_PERSIST_EVERY;

/// Tunables for a [`StepTracker`](crate::StepTracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Persist the live total whenever the sensor's own counter is a multiple
    /// of this. At most `persist_every - 1` steps are at risk if the process
    /// dies between saves. Zero disables throttled saves (backgrounding still
    /// flushes).
    pub persist_every: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            persist_every: DEFAULT_PERSIST_EVERY,
        }
    }
}

impl TrackerConfig {
    /// Whether an event carrying `cumulative` should trigger a save.
    pub fn should_persist(&self, cumulative: u64) -> bool {
        self.persist_every != 0 && cumulative % self.persist_every == 0
    }
}

impl From<&Settings> for TrackerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            persist_every: settings.persist_every,
        }
    }
}
