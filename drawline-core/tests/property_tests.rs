//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Cycle bookkeeping — steps stay within 1..=N, ids never decrease, and a
//!    cycle is never both complete and burst
//! 2. Fire pause — no three consecutive fires, ever
//! 3. Gap consistency — the big-gap flag is exactly `gap >= 2`
//! 4. Determinism — a full recompute is a fixed point of the incremental
//!    pipeline for arbitrary draw sequences

use proptest::prelude::*;
use drawline_core::cycle::CycleAssigner;
use drawline_core::domain::CandidatePool;
use drawline_core::scoring::{ScoreRule, ScoringEngine};
use drawline_core::{fingerprint, EngineConfig, Period, Processor};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_fire_win_seq() -> impl Strategy<Value = Vec<(bool, bool)>> {
    prop::collection::vec((any::<bool>(), any::<bool>()), 0..80)
}

fn arb_cycle_length() -> impl Strategy<Value = u32> {
    3u32..=10
}

fn arb_draws() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[0-9]{3}", 1..60)
}

fn synthetic_periods(flags: &[(bool, bool)]) -> Vec<Period> {
    flags
        .iter()
        .enumerate()
        .map(|(i, &(fire, win))| {
            let mut p = Period::new(format!("{}", 1000 + i), "000");
            p.should_fire = fire;
            p.is_win = win;
            p
        })
        .collect()
}

struct AlwaysOn;

impl ScoreRule for AlwaysOn {
    fn name(&self) -> &str {
        "always-on"
    }
    fn rationale(&self) -> &str {
        "fixed test delta"
    }
    fn base_delta(&self) -> i64 {
        100
    }
    fn applies(&self, _current: &Period, _history: &[Period]) -> bool {
        true
    }
}

/// Processor whose score never blocks a fire, against a pool that wins on
/// roughly a tenth of the draw space.
fn eager_processor() -> Processor {
    let scoring = ScoringEngine::new(vec![Box::new(AlwaysOn)]);
    let mut proc = Processor::with_rules(EngineConfig::default(), scoring).unwrap();
    let pool: Vec<String> = (0..100).map(|i| format!("{:03}", i * 10 % 1000)).collect();
    proc.set_candidate_pool(CandidatePool::from_values(pool));
    proc
}

fn ingest(proc: &mut Processor, draws: &[String]) {
    for (i, draw) in draws.iter().enumerate() {
        proc.append_period(&format!("{}", 5001 + i), draw).unwrap();
    }
}

// ── 1. Cycle bookkeeping ─────────────────────────────────────────────

proptest! {
    /// Steps stay within 1..=N and every non-fire period carries zeroes.
    #[test]
    fn cycle_steps_stay_in_range(flags in arb_fire_win_seq(), n in arb_cycle_length()) {
        let mut periods = synthetic_periods(&flags);
        CycleAssigner::new(n).assign(&mut periods);
        for p in &periods {
            if p.should_fire {
                prop_assert!(p.in_cycle);
                prop_assert!(p.cycle_id >= 1);
                prop_assert!((1..=n).contains(&p.cycle_step));
            } else {
                prop_assert!(!p.in_cycle);
                prop_assert_eq!(p.cycle_id, 0);
                prop_assert_eq!(p.cycle_step, 0);
            }
            prop_assert!(!(p.cycle_complete && p.cycle_burst));
        }
    }

    /// Cycle ids never decrease across fires, and a fresh id starts at step 1
    /// while a continued id advances by exactly one step.
    #[test]
    fn cycle_ids_monotonic_and_steps_sequential(
        flags in arb_fire_win_seq(),
        n in arb_cycle_length(),
    ) {
        let mut periods = synthetic_periods(&flags);
        CycleAssigner::new(n).assign(&mut periods);
        let fires: Vec<&Period> = periods.iter().filter(|p| p.should_fire).collect();
        for pair in fires.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            prop_assert!(next.cycle_id >= prev.cycle_id);
            if next.cycle_id == prev.cycle_id {
                prop_assert_eq!(next.cycle_step, prev.cycle_step + 1);
            } else {
                prop_assert_eq!(next.cycle_id, prev.cycle_id + 1);
                prop_assert_eq!(next.cycle_step, 1);
            }
        }
    }

    /// Every fire in a cycle shares the closure outcome.
    #[test]
    fn cycle_outcome_is_shared(flags in arb_fire_win_seq(), n in arb_cycle_length()) {
        let mut periods = synthetic_periods(&flags);
        CycleAssigner::new(n).assign(&mut periods);
        let fires: Vec<&Period> = periods.iter().filter(|p| p.should_fire).collect();
        for a in &fires {
            for b in &fires {
                if a.cycle_id == b.cycle_id {
                    prop_assert_eq!(a.cycle_complete, b.cycle_complete);
                    prop_assert_eq!(a.cycle_burst, b.cycle_burst);
                }
            }
        }
    }

    /// Running the assigner twice changes nothing.
    #[test]
    fn cycle_assignment_is_idempotent(flags in arb_fire_win_seq(), n in arb_cycle_length()) {
        let mut periods = synthetic_periods(&flags);
        let assigner = CycleAssigner::new(n);
        assigner.assign(&mut periods);
        let snapshot = periods.clone();
        assigner.assign(&mut periods);
        prop_assert_eq!(periods, snapshot);
    }
}

// ── 2–4. End-to-end invariants over arbitrary draws ──────────────────

proptest! {
    /// Two consecutive fires always force a pause on the next period.
    #[test]
    fn no_three_consecutive_fires(draws in arb_draws()) {
        let mut proc = eager_processor();
        ingest(&mut proc, &draws);
        let history = proc.history();
        for w in history.windows(3) {
            prop_assert!(
                !(w[0].should_fire && w[1].should_fire && w[2].should_fire),
                "three consecutive fires at period {}",
                w[2].period_id
            );
        }
    }

    /// The big-gap flag is exactly the gap threshold test, and a winning
    /// period always carries a gap of zero.
    #[test]
    fn gap_flags_are_consistent(draws in arb_draws()) {
        let mut proc = eager_processor();
        ingest(&mut proc, &draws);
        for p in proc.history() {
            prop_assert_eq!(p.is_big_gap, p.gap_value >= 2);
            if p.is_win {
                prop_assert_eq!(p.gap_value, 0);
            }
        }
    }

    /// A full recompute against an unchanged pool reproduces the
    /// incrementally-built state byte for byte.
    #[test]
    fn recompute_is_a_fixed_point(draws in arb_draws()) {
        let mut proc = eager_processor();
        ingest(&mut proc, &draws);
        let before = fingerprint::derived_state(proc.history());
        proc.recompute_all();
        prop_assert_eq!(before, fingerprint::derived_state(proc.history()));
    }

    /// Scores and breakdowns are pure functions of the input sequence.
    #[test]
    fn identical_draw_sequences_agree(draws in arb_draws()) {
        let mut a = eager_processor();
        let mut b = eager_processor();
        ingest(&mut a, &draws);
        ingest(&mut b, &draws);
        prop_assert_eq!(
            fingerprint::derived_state(a.history()),
            fingerprint::derived_state(b.history())
        );
    }
}
