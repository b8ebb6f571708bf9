//! Stress and boss alert state.
//!
//! Two bounded integer levels evolve over time and in response to breaks:
//! stress climbs passively and drops on breaks, the boss alert level rises
//! probabilistically on breaks and cools down on a timer. [`StateCore`]
//! guards both behind one lock.

pub mod alert;
pub mod clock;
pub mod engine;
pub mod random;
pub mod stress;

pub use alert::{AlertDecay, AlertRise, AlertSnapshot, AlertTracker, MAX_ALERT};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{BreakOutcome, COOLDOWN_TICK, CooldownTask, StateCore, StateSnapshot};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use stress::{MAX_STRESS, StressAccrual, StressSnapshot, StressTracker};
