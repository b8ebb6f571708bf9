//! Boss alert tracking.
//!
//! The alert level rises by one on a probabilistic hit whenever a break is
//! taken and falls by one after each uninterrupted cooldown window.
//!
//! A break rolls `1..=100` and hits when the roll is `<=` the configured
//! probability, so 100% always hits. Zero probability short-circuits
//! before rolling, so it never hits.

use chrono::{DateTime, TimeDelta, Utc};

use super::clock::elapsed_since;
use super::random::RandomSource;

/// Upper bound of the boss alert level.
pub const MAX_ALERT: u8 = 5;

/// A successful rise from [`AlertTracker::register_break`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRise {
    /// Level before the rise.
    pub old_level: u8,
    /// Level after the rise.
    pub new_level: u8,
}

/// A successful decay step from [`AlertTracker::cooldown_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecay {
    /// Level before the decay.
    pub old_level: u8,
    /// Level after the decay.
    pub new_level: u8,
    /// Time since the previous change when the step fired.
    pub elapsed: TimeDelta,
}

/// Read-only view of the alert tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSnapshot {
    /// Current alert level.
    pub level: u8,
    /// Configured hit probability in percent.
    pub alertness_probability: u8,
    /// Configured cooldown window in seconds.
    pub cooldown_seconds: u64,
    /// When the level last changed.
    pub last_change_time: DateTime<Utc>,
}

/// Boss alert level with probabilistic rise and timed decay.
#[derive(Debug, Clone)]
pub struct AlertTracker {
    level: u8,
    alertness_probability: u8,
    cooldown_seconds: u64,
    last_change_time: DateTime<Utc>,
}

impl AlertTracker {
    /// Creates a tracker at level 0.
    ///
    /// `alertness_probability` must already be validated to `0..=100`.
    #[must_use]
    pub const fn new(alertness_probability: u8, cooldown_seconds: u64, now: DateTime<Utc>) -> Self {
        Self {
            level: 0,
            alertness_probability,
            cooldown_seconds,
            last_change_time: now,
        }
    }

    /// Current alert level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Whether the level sits at [`MAX_ALERT`].
    #[must_use]
    pub const fn is_maxed(&self) -> bool {
        self.level >= MAX_ALERT
    }

    /// Rolls for a rise after a break.
    ///
    /// Returns `Some` only when the level actually changed; a hit at
    /// [`MAX_ALERT`] is not a change and leaves `last_change_time` alone.
    pub fn register_break(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Option<AlertRise> {
        if self.alertness_probability == 0 {
            return None;
        }
        if rng.roll_percent() > self.alertness_probability {
            return None;
        }

        let old_level = self.level;
        self.level = (old_level + 1).min(MAX_ALERT);
        if self.level == old_level {
            return None;
        }
        self.last_change_time = now;
        Some(AlertRise {
            old_level,
            new_level: self.level,
        })
    }

    /// Decays one step if a full cooldown window has passed since the last
    /// change.
    pub fn cooldown_step(&mut self, now: DateTime<Utc>) -> Option<AlertDecay> {
        if self.level == 0 {
            return None;
        }
        let elapsed = elapsed_since(self.last_change_time, now);
        if elapsed < self.cooldown_window() {
            return None;
        }

        let old_level = self.level;
        self.level -= 1;
        self.last_change_time = now;
        Some(AlertDecay {
            old_level,
            new_level: self.level,
            elapsed,
        })
    }

    /// Whole seconds until the next decay step would fire.
    ///
    /// Zero when the level is already 0 or the window has elapsed.
    #[must_use]
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> u64 {
        if self.level == 0 {
            return 0;
        }
        let elapsed = u64::try_from(elapsed_since(self.last_change_time, now).num_seconds())
            .unwrap_or(0);
        self.cooldown_seconds.saturating_sub(elapsed)
    }

    /// Returns the current state without touching it.
    #[must_use]
    pub const fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            level: self.level,
            alertness_probability: self.alertness_probability,
            cooldown_seconds: self.cooldown_seconds,
            last_change_time: self.last_change_time,
        }
    }

    fn cooldown_window(&self) -> TimeDelta {
        i64::try_from(self.cooldown_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}
