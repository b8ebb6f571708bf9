//! Agent stress tracking.
//!
//! Stress builds up by one point per whole minute since the last break and
//! drops by a random `1..=100` on every break.

use chrono::{DateTime, Utc};

use super::clock::elapsed_since;
use super::random::RandomSource;

/// Upper bound of the stress level.
pub const MAX_STRESS: u8 = 100;

/// Passive accrual applied by [`StressTracker::apply_elapsed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressAccrual {
    /// Level before the accrual.
    pub old_level: u8,
    /// Level after the accrual.
    pub new_level: u8,
    /// Whole minutes newly credited by this call.
    pub minutes: u64,
}

/// Read-only view of the stress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressSnapshot {
    /// Current stress level.
    pub level: u8,
    /// When the last break was taken (or the tracker was created).
    pub last_break_time: DateTime<Utc>,
}

/// Stress level with passive time-based accrual.
///
/// The whole minutes already credited since `last_break_time` are
/// remembered, so repeated calls inside the same minute add nothing while
/// partial minutes keep counting toward the next tick.
#[derive(Debug, Clone)]
pub struct StressTracker {
    level: u8,
    last_break_time: DateTime<Utc>,
    credited_minutes: i64,
}

impl StressTracker {
    /// Creates a tracker at level 0 whose break timer starts at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            level: 0,
            last_break_time: now,
            credited_minutes: 0,
        }
    }

    /// Current stress level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// When the last break was taken.
    #[must_use]
    pub const fn last_break_time(&self) -> DateTime<Utc> {
        self.last_break_time
    }

    /// Credits whole minutes elapsed since the last break.
    ///
    /// Returns `Some` only when the level actually moved.
    pub fn apply_elapsed(&mut self, now: DateTime<Utc>) -> Option<StressAccrual> {
        let total_minutes = elapsed_since(self.last_break_time, now).num_minutes();
        let fresh = total_minutes - self.credited_minutes;
        if fresh <= 0 {
            return None;
        }
        self.credited_minutes = total_minutes;

        let minutes = u64::try_from(fresh).unwrap_or(u64::MAX);
        let old_level = self.level;
        let raised = u64::from(old_level).saturating_add(minutes);
        self.level = u8::try_from(raised.min(u64::from(MAX_STRESS))).unwrap_or(MAX_STRESS);

        (self.level != old_level).then_some(StressAccrual {
            old_level,
            new_level: self.level,
            minutes,
        })
    }

    /// Applies a break: subtracts a random `1..=100`, floors at 0, and
    /// restarts the break timer at `now`.
    ///
    /// Returns the reduction that was drawn, whether or not all of it could
    /// be applied.
    pub fn reduce_for_break(&mut self, now: DateTime<Utc>, rng: &mut dyn RandomSource) -> u8 {
        let reduction = rng.roll_percent();
        self.level = self.level.saturating_sub(reduction);
        self.last_break_time = now;
        self.credited_minutes = 0;
        reduction
    }

    /// Returns the current state without touching it.
    #[must_use]
    pub const fn snapshot(&self) -> StressSnapshot {
        StressSnapshot {
            level: self.level,
            last_break_time: self.last_break_time,
        }
    }
}
