//! Wall-clock abstraction for the state core.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Shared between a test and the core through an `Arc`, so the test can
/// step time forward (or backward, to simulate clock skew) deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let delta = TimeDelta::from_std(step).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    /// Moves the clock backward by `step`.
    pub fn rewind(&self, step: Duration) {
        let delta = TimeDelta::from_std(step).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_sub_signed(delta).unwrap_or(*now);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Non-negative elapsed time from `earlier` to `later`.
///
/// A clock that moved backward yields zero instead of a negative span.
#[must_use]
pub fn elapsed_since(earlier: DateTime<Utc>, later: DateTime<Utc>) -> TimeDelta {
    later
        .signed_duration_since(earlier)
        .max(TimeDelta::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_rewinds() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now(), start + TimeDelta::seconds(90));

        clock.rewind(Duration::from_secs(30));
        assert_eq!(clock.now(), start + TimeDelta::seconds(60));
    }

    #[test]
    fn elapsed_clamps_negative_to_zero() {
        let now = Utc::now();
        let earlier = now - TimeDelta::seconds(5);
        assert_eq!(elapsed_since(earlier, now), TimeDelta::seconds(5));
        assert_eq!(elapsed_since(now, earlier), TimeDelta::zero());
    }
}
