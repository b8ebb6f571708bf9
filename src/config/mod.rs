//! Runtime configuration
//!
//! Validated settings handed to the state core at startup. The CLI parses
//! raw signed integers so that out-of-range values reach [`RuntimeConfig::new`]
//! and are rejected with a [`ConfigError`] instead of being clamped.

use std::time::Duration;

use crate::error::ConfigError;

/// Default probability (percent) that a break raises the boss alert level.
pub const DEFAULT_BOSS_ALERTNESS: i64 = 50;

/// Default cooldown in seconds before the boss alert level decays by one.
pub const DEFAULT_BOSS_ALERTNESS_COOLDOWN: i64 = 300;

/// Default mandated delay in seconds applied while the boss alert is maxed.
pub const DEFAULT_BREAK_DELAY_SECS: u64 = 20;

/// Upper bound for `boss_alertness`.
pub const MAX_ALERTNESS: u8 = 100;

// The CLI defaults above, checked and narrowed at compile time.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
const DEFAULT_ALERTNESS_PERCENT: u8 = {
    assert!(DEFAULT_BOSS_ALERTNESS >= 0 && DEFAULT_BOSS_ALERTNESS <= MAX_ALERTNESS as i64);
    DEFAULT_BOSS_ALERTNESS as u8
};
#[allow(clippy::cast_sign_loss)]
const DEFAULT_COOLDOWN_SECS: u64 = {
    assert!(DEFAULT_BOSS_ALERTNESS_COOLDOWN >= 0);
    DEFAULT_BOSS_ALERTNESS_COOLDOWN as u64
};

/// Validated runtime configuration.
///
/// Immutable after construction; the state core reads these values without
/// taking its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    boss_alertness: u8,
    boss_alertness_cooldown: u64,
    break_delay: Duration,
}

impl RuntimeConfig {
    /// Builds a configuration from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `boss_alertness` is outside
    /// `0..=100` or `boss_alertness_cooldown` is negative.
    pub fn new(boss_alertness: i64, boss_alertness_cooldown: i64) -> Result<Self, ConfigError> {
        let alertness = u8::try_from(boss_alertness)
            .ok()
            .filter(|p| *p <= MAX_ALERTNESS)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "boss_alertness".to_string(),
                value: boss_alertness.to_string(),
                expected: "a percentage between 0 and 100".to_string(),
            })?;

        let cooldown =
            u64::try_from(boss_alertness_cooldown).map_err(|_| ConfigError::InvalidValue {
                field: "boss_alertness_cooldown".to_string(),
                value: boss_alertness_cooldown.to_string(),
                expected: "a non-negative number of seconds".to_string(),
            })?;

        Ok(Self {
            boss_alertness: alertness,
            boss_alertness_cooldown: cooldown,
            break_delay: Duration::from_secs(DEFAULT_BREAK_DELAY_SECS),
        })
    }

    /// Replaces the mandated delay applied when the boss alert is maxed.
    #[must_use]
    pub const fn with_break_delay(mut self, delay: Duration) -> Self {
        self.break_delay = delay;
        self
    }

    /// Probability (percent) that a break raises the boss alert level.
    #[must_use]
    pub const fn boss_alertness(&self) -> u8 {
        self.boss_alertness
    }

    /// Seconds without a new alert rise before the level decays by one.
    #[must_use]
    pub const fn boss_alertness_cooldown(&self) -> u64 {
        self.boss_alertness_cooldown
    }

    /// Mandated delay imposed on a break that leaves the alert at its maximum.
    #[must_use]
    pub const fn break_delay(&self) -> Duration {
        self.break_delay
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            boss_alertness: DEFAULT_ALERTNESS_PERCENT,
            boss_alertness_cooldown: DEFAULT_COOLDOWN_SECS,
            break_delay: Duration::from_secs(DEFAULT_BREAK_DELAY_SECS),
        }
    }
}
