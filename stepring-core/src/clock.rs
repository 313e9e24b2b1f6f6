//! Time source abstraction.
//!
//! Day-boundary decisions go through a [`Clock`] so they can be driven
//! deterministically in tests instead of reading the system clock ad hoc.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::{Mutex, PoisonError};

/// Source of "now" in local wall-clock time.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// First valid local instant of `date`.
    fn start_of_day(&self, date: NaiveDate) -> DateTime<Local> {
        local_midnight(date).unwrap_or_else(|| self.now())
    }
}

/// Returns the first valid local instant of a calendar day.
///
/// Midnight may not exist on DST transition days, in which case the first
/// whole hour that does exist is used.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    (0..24).find_map(|hour| {
        date.and_hms_opt(hour, 0, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    })
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Creates a clock frozen at a local wall-clock time.
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self::new(resolve_local(naive))
    }

    /// Creates a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Local::now())
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock to a local wall-clock time.
    pub fn set_naive(&self, naive: NaiveDateTime) {
        self.set(resolve_local(naive));
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}
