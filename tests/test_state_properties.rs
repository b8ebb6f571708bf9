//! Property tests for the stress and boss alert state core.

use std::sync::Arc;
use std::time::Duration;

use chillmcp::config::RuntimeConfig;
use chillmcp::state::{
    Clock, MAX_ALERT, MAX_STRESS, ManualClock, ScriptedRandom, StateCore, StdRandom,
};
use chrono::DateTime;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Break,
    Advance(u64),
    Tick,
    Snapshot,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Break),
        3 => (0_u64..900).prop_map(Op::Advance),
        2 => Just(Op::Tick),
        1 => Just(Op::Snapshot),
    ]
}

fn seeded_core(alertness: u8, cooldown: u64, seed: u64) -> (StateCore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
    ));
    let config = RuntimeConfig::new(i64::from(alertness), i64::try_from(cooldown).unwrap())
        .expect("valid config");
    let core = StateCore::with_sources(
        config,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Box::new(StdRandom::seeded(seed)),
    );
    (core, clock)
}

proptest! {
    #[test]
    fn levels_stay_in_bounds(
        alertness in 0_u8..=100,
        cooldown in 0_u64..600,
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let (core, clock) = seeded_core(alertness, cooldown, seed);
        for op in ops {
            match op {
                Op::Break => {
                    let outcome = core.take_break();
                    prop_assert!(outcome.stress_level <= MAX_STRESS);
                    prop_assert!(outcome.alert_level <= MAX_ALERT);
                    prop_assert!((1..=100).contains(&outcome.stress_reduction));
                    prop_assert_eq!(outcome.delay_required, outcome.alert_level == MAX_ALERT);
                }
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs)),
                Op::Tick => {
                    if let Some(decay) = core.cooldown_tick() {
                        prop_assert_eq!(decay.new_level + 1, decay.old_level);
                    }
                }
                Op::Snapshot => {
                    let snap = core.snapshot();
                    prop_assert!(snap.stress_level <= MAX_STRESS);
                    prop_assert!(snap.alert_level <= MAX_ALERT);
                    prop_assert_eq!(snap.delay_active, snap.alert_level == MAX_ALERT);
                }
            }
        }
    }

    #[test]
    fn zero_alertness_never_raises_alert(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let (core, clock) = seeded_core(0, 30, seed);
        for op in ops {
            match op {
                Op::Break => prop_assert_eq!(core.take_break().alert_level, 0),
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs)),
                Op::Tick => prop_assert!(core.cooldown_tick().is_none()),
                Op::Snapshot => prop_assert_eq!(core.snapshot().alert_level, 0),
            }
        }
    }

    #[test]
    fn full_alertness_rises_by_exactly_one(breaks in 1_usize..12) {
        let (core, _clock) = seeded_core(100, 3600, 0);
        for n in 1..=breaks {
            let expected = u8::try_from(n.min(usize::from(MAX_ALERT))).unwrap();
            prop_assert_eq!(core.take_break().alert_level, expected);
        }
    }

    #[test]
    fn snapshots_never_touch_alert_or_break_timer(
        breaks in 0_usize..6,
        polls in 1_usize..20,
        gap in 0_u64..120,
    ) {
        let (core, clock) = seeded_core(100, 3600, 1);
        for _ in 0..breaks {
            core.take_break();
        }
        let first = core.snapshot();
        for _ in 0..polls {
            clock.advance(Duration::from_secs(gap));
            let snap = core.snapshot();
            prop_assert_eq!(snap.alert_level, first.alert_level);
            prop_assert_eq!(snap.last_break_time, first.last_break_time);
            prop_assert_eq!(snap.last_alert_change_time, first.last_alert_change_time);
        }
    }

    #[test]
    fn one_decay_per_elapsed_window(
        start_level in 1_u8..=5,
        cooldown in 1_u64..30,
        windows in 0_u64..8,
    ) {
        let (core, clock) = seeded_core(100, cooldown, 2);
        for _ in 0..start_level {
            core.take_break();
        }
        // Tick once per simulated second, as the background task does.
        for _ in 0..(cooldown * windows) {
            clock.advance(Duration::from_secs(1));
            core.cooldown_tick();
        }
        let expected = start_level.saturating_sub(u8::try_from(windows).unwrap());
        prop_assert_eq!(core.snapshot().alert_level, expected);
    }
}

#[test]
fn concurrent_breaks_apply_every_reduction() {
    const CALLERS: usize = 20;

    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
    ));
    let core = Arc::new(StateCore::with_sources(
        RuntimeConfig::new(100, 3600).expect("valid config"),
        Arc::clone(&clock) as Arc<dyn Clock>,
        Box::new(ScriptedRandom::constant(1)),
    ));
    clock.advance(Duration::from_secs(100 * 60));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let core = Arc::clone(&core);
            std::thread::spawn(move || core.take_break())
        })
        .collect();
    let maxed = handles
        .into_iter()
        .map(|h| h.join().expect("break thread panicked"))
        .filter(|o| o.delay_required)
        .count();

    let snap = core.snapshot();
    assert_eq!(snap.alert_level, MAX_ALERT);
    assert_eq!(usize::from(snap.stress_level), 100 - CALLERS);
    assert_eq!(maxed, CALLERS - 4);
}
