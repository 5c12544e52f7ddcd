//! Time provider abstraction
//!
//! Account creation times, document sync stamps and token issue times all come
//! from a [`Clock`], so tests can pin them while production code reads the
//! system time.
//!
//! # Example
//!
//! ```
//! use notesync::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let millis = clock.now_millis();
//! let now = clock.now_utc();
//! assert_eq!(now.timestamp_millis() / 1000, (millis / 1000) as i64);
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as a UTC datetime.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis() as i64).unwrap_or_default()
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Test clock that only moves when told to.
///
/// Unlike [`SystemClock`], two reads without an [`advance`](FixedClock::advance)
/// in between return the same instant, which makes "was the stamp updated"
/// assertions deterministic.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct FixedClock {
    millis: Mutex<u64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock frozen at the given milliseconds since Unix epoch.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, ms: u64) {
        *self.millis.lock().unwrap() += ms;
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: u64) {
        *self.millis.lock().unwrap() = ms;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        *self.millis.lock().unwrap()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}
