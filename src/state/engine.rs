//! The shared state core.
//!
//! [`StateCore`] owns the stress and alert trackers behind a single mutex.
//! Break handling, snapshots, and the background cooldown loop all go
//! through that one lock, so no caller ever observes a half-updated pair.
//! Timestamps are read and level gauges published while the lock is held,
//! so state changes and their times are ordered the same way. Critical
//! sections never `.await`; the mandated delay is the caller's job after
//! the lock is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::alert::{AlertDecay, AlertTracker};
use super::clock::{Clock, SystemClock};
use super::random::{RandomSource, StdRandom};
use super::stress::StressTracker;
use crate::config::RuntimeConfig;
use crate::observability::metrics;

/// How often the cooldown loop wakes up.
///
/// Must stay finer than the smallest useful cooldown window.
pub const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// Result of [`StateCore::take_break`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakOutcome {
    /// Stress level after the break.
    pub stress_level: u8,
    /// Boss alert level after the break.
    pub alert_level: u8,
    /// Whether the caller must wait out the mandated delay.
    pub delay_required: bool,
    /// Stress reduction drawn for this break.
    pub stress_reduction: u8,
}

/// Read-only dump of the core's state.
///
/// Field names on the wire match what status clients already consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Current stress level (0-100).
    pub stress_level: u8,
    /// When the last break was taken.
    pub last_break_time: DateTime<Utc>,
    /// Current boss alert level (0-5).
    #[serde(rename = "boss_alert_level")]
    pub alert_level: u8,
    /// Configured alert probability in percent.
    #[serde(rename = "boss_alertness")]
    pub alertness_probability: u8,
    /// Configured cooldown window in seconds.
    #[serde(rename = "boss_alertness_cooldown")]
    pub cooldown_seconds: u64,
    /// When the alert level last changed.
    #[serde(rename = "last_boss_cooldown_time")]
    pub last_alert_change_time: DateTime<Utc>,
    /// Seconds until the alert level next decays.
    pub cooldown_seconds_remaining: u64,
    /// Whether the next break will be delayed.
    pub delay_active: bool,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Everything guarded by the core's lock.
#[derive(Debug)]
struct Trackers {
    stress: StressTracker,
    alert: AlertTracker,
    rng: Box<dyn RandomSource>,
}

/// Stress and boss alert state shared by every request handler.
///
/// Construct once at startup and hand out `Arc<StateCore>`; independent
/// instances never share anything, so tests can build as many as they like.
#[derive(Debug)]
pub struct StateCore {
    trackers: Mutex<Trackers>,
    config: RuntimeConfig,
    clock: Arc<dyn Clock>,
}

impl StateCore {
    /// Creates a core using the system clock and an OS-seeded RNG.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_sources(config, Arc::new(SystemClock), Box::new(StdRandom::from_os()))
    }

    /// Creates a core with explicit time and randomness sources.
    #[must_use]
    pub fn with_sources(
        config: RuntimeConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let now = clock.now();
        info!(
            boss_alertness = config.boss_alertness(),
            cooldown_secs = config.boss_alertness_cooldown(),
            "state core initialized"
        );
        Self {
            trackers: Mutex::new(Trackers {
                stress: StressTracker::new(now),
                alert: AlertTracker::new(
                    config.boss_alertness(),
                    config.boss_alertness_cooldown(),
                    now,
                ),
                rng,
            }),
            config,
            clock,
        }
    }

    /// Returns the configuration this core was built with.
    ///
    /// Immutable, so reading it needs no lock.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Processes one break.
    ///
    /// Applies passive stress accrual, reduces stress by a random amount,
    /// rolls for a boss alert rise, and reports whether the alert is now
    /// maxed. The mandated delay is not applied here.
    pub fn take_break(&self) -> BreakOutcome {
        let mut guard = self.lock();
        let now = self.clock.now();
        let Trackers { stress, alert, rng } = &mut *guard;

        let accrual = stress.apply_elapsed(now);
        let before_break = stress.level();
        let reduction = stress.reduce_for_break(now, rng.as_mut());
        let rise = alert.register_break(now, rng.as_mut());

        let outcome = BreakOutcome {
            stress_level: stress.level(),
            alert_level: alert.level(),
            delay_required: alert.is_maxed(),
            stress_reduction: reduction,
        };
        metrics::set_levels(outcome.stress_level, outcome.alert_level);
        drop(guard);

        if let Some(accrual) = accrual {
            info!(
                from = accrual.old_level,
                to = accrual.new_level,
                minutes = accrual.minutes,
                "stress auto-increased"
            );
        }
        info!(
            from = before_break,
            to = outcome.stress_level,
            reduction,
            "break taken"
        );
        if let Some(rise) = rise {
            warn!(from = rise.old_level, to = rise.new_level, "boss alert increased");
        }
        if outcome.delay_required {
            warn!(
                delay_secs = self.config.break_delay().as_secs(),
                "boss alert maxed, break will be delayed"
            );
        }

        outcome
    }

    /// Returns a read-only view of the current state.
    ///
    /// Passive stress accrual is applied first so the view is fresh; alert
    /// state and the break timer are never touched.
    pub fn snapshot(&self) -> StateSnapshot {
        let mut guard = self.lock();
        let now = self.clock.now();

        let accrual = guard.stress.apply_elapsed(now);
        let stress = guard.stress.snapshot();
        let alert = guard.alert.snapshot();
        let cooldown_seconds_remaining = guard.alert.cooldown_remaining(now);
        let delay_active = guard.alert.is_maxed();
        if accrual.is_some() {
            metrics::set_levels(stress.level, alert.level);
        }
        drop(guard);

        if let Some(accrual) = accrual {
            info!(
                from = accrual.old_level,
                to = accrual.new_level,
                minutes = accrual.minutes,
                "stress auto-increased"
            );
        }

        StateSnapshot {
            stress_level: stress.level,
            last_break_time: stress.last_break_time,
            alert_level: alert.level,
            alertness_probability: alert.alertness_probability,
            cooldown_seconds: alert.cooldown_seconds,
            last_alert_change_time: alert.last_change_time,
            cooldown_seconds_remaining,
            delay_active,
            timestamp: now,
        }
    }

    /// Runs one iteration of the cooldown loop.
    ///
    /// Returns the decay step if one fired.
    pub fn cooldown_tick(&self) -> Option<AlertDecay> {
        let mut guard = self.lock();
        let now = self.clock.now();
        let decay = guard.alert.cooldown_step(now);
        if let Some(decay) = decay {
            metrics::set_alert_level(decay.new_level);
        }
        drop(guard);

        if let Some(decay) = decay {
            #[allow(clippy::cast_precision_loss)]
            let elapsed_secs = decay.elapsed.num_milliseconds() as f64 / 1000.0;
            info!(
                from = decay.old_level,
                to = decay.new_level,
                elapsed_secs,
                "boss alert cooled down"
            );
        }
        decay
    }

    /// Spawns the background cooldown loop on the current tokio runtime.
    ///
    /// The loop calls [`cooldown_tick`](Self::cooldown_tick) every `period`
    /// until the returned handle is cancelled. Dropping the handle without
    /// cancelling leaves the loop running for the life of the runtime.
    #[must_use]
    pub fn start_cooldown_task(self: &Arc<Self>, period: Duration) -> CooldownTask {
        let core = Arc::clone(self);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!("cooldown task cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        core.cooldown_tick();
                    }
                }
            }
        });
        info!(period_ms = period.as_millis(), "boss alert cooldown task started");
        CooldownTask { cancel, handle }
    }

    /// Acquires the tracker lock.
    ///
    /// Every critical section leaves both trackers within their bounds, so
    /// a poisoned lock still guards valid state and is recovered.
    fn lock(&self) -> MutexGuard<'_, Trackers> {
        self.trackers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the background cooldown loop.
#[derive(Debug)]
pub struct CooldownTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CooldownTask {
    /// Signals the loop to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "cooldown task panicked");
            }
        }
    }
}
