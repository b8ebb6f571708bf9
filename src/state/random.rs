//! Injectable randomness for the state core.
//!
//! Every random draw the core makes is a percentage roll in `1..=100`:
//! the stress reduction amount and the boss alert hit check. Production
//! uses an OS-seeded [`StdRng`]; tests script the exact sequence.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lowest value a percentage roll can produce.
pub const ROLL_MIN: u8 = 1;

/// Highest value a percentage roll can produce.
pub const ROLL_MAX: u8 = 100;

/// Source of uniformly distributed percentage rolls.
///
/// Lives inside the state core's lock, so implementations get `&mut self`
/// and never need their own synchronization.
pub trait RandomSource: Send + std::fmt::Debug {
    /// Draws an integer in `1..=100` inclusive.
    fn roll_percent(&mut self) -> u8;
}

/// [`RandomSource`] backed by [`StdRng`].
#[derive(Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Creates a source seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible source from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_os()
    }
}

impl RandomSource for StdRandom {
    fn roll_percent(&mut self) -> u8 {
        self.rng.random_range(ROLL_MIN..=ROLL_MAX)
    }
}

/// [`RandomSource`] replaying a fixed script of rolls, cycling forever.
///
/// Scripted values are clamped into `1..=100` so a script can never
/// produce a roll the real source could not.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    script: VecDeque<u8>,
}

impl ScriptedRandom {
    /// Creates a source that replays `rolls` in order, then starts over.
    ///
    /// An empty script behaves like `[ROLL_MAX]`.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        let mut script: VecDeque<u8> = rolls
            .into_iter()
            .map(|r| r.clamp(ROLL_MIN, ROLL_MAX))
            .collect();
        if script.is_empty() {
            script.push_back(ROLL_MAX);
        }
        Self { script }
    }

    /// Creates a source that always rolls `value`.
    #[must_use]
    pub fn constant(value: u8) -> Self {
        Self::new([value])
    }
}

impl RandomSource for ScriptedRandom {
    fn roll_percent(&mut self) -> u8 {
        let roll = self.script.pop_front().unwrap_or(ROLL_MAX);
        self.script.push_back(roll);
        roll
    }
}
