//! Fire gating and cycle bookkeeping.
//!
//! A "fire" is the decision to bet on a period. Consecutive fires share a
//! cycle; a cycle closes the instant the period following one of its fires
//! wins (complete), or when a fire at the step cap is followed by a loss
//! (burst). Cycle attribution is a single forward pass over the whole
//! history — the canonical fixed-point formulation — rerun after every
//! append, which is also what backfills the previous fire's outcome once the
//! new period's win status is known.

use crate::config::EngineConfig;
use crate::domain::Period;

/// Per-period fire decision.
///
/// Fires iff the score clears the threshold, no trend segment is active,
/// bands exist with the K-value at or above the middle band, and the two
/// immediately preceding periods did not both fire.
pub fn fire_gate(score: i64, current: &Period, history: &[Period], config: &EngineConfig) -> bool {
    let score_ok = score >= config.fire_score_threshold;
    let not_in_trend = !current.is_trend_segment;
    let k_above_middle = current
        .bands
        .as_ref()
        .is_some_and(|b| current.k_value >= b.middle);
    let paused = history.len() >= 2
        && history[history.len() - 1].should_fire
        && history[history.len() - 2].should_fire;

    score_ok && not_in_trend && k_above_middle && !paused
}

/// Assigns cycle ids, steps and outcomes across a period slice.
pub struct CycleAssigner {
    cycle_length: u32,
}

impl CycleAssigner {
    pub fn new(cycle_length: u32) -> Self {
        assert!(cycle_length >= 3, "cycle length must be >= 3");
        Self { cycle_length }
    }

    /// Recompute cycle membership and outcomes for the whole slice.
    ///
    /// Idempotent: fire decisions are inputs here, so a second run over the
    /// same slice reproduces identical fields. Internal invariant violations
    /// panic — partially-consistent cycle data must never survive, because
    /// bookkeeping errors compound silently over long histories.
    pub fn assign(&self, periods: &mut [Period]) {
        for p in periods.iter_mut() {
            p.cycle_id = 0;
            p.cycle_step = 0;
            p.in_cycle = false;
            p.cycle_complete = false;
            p.cycle_burst = false;
            p.fire_outcome_known = false;
            p.fire_succeeded = false;
        }

        let cap = self.cycle_length;

        // Pass 1: cycle id / step per fire.
        let mut prev_fire: Option<usize> = None;
        for i in 0..periods.len() {
            if !periods[i].should_fire {
                continue;
            }
            let (cycle_id, step) = match prev_fire {
                None => (1, 1),
                Some(j) => {
                    let prev_cycle = periods[j].cycle_id;
                    let prev_step = periods[j].cycle_step;
                    // The period after fire j always exists here (j < i).
                    let prev_closed = periods[j + 1].is_win || prev_step == cap;
                    if prev_closed {
                        (prev_cycle + 1, 1)
                    } else {
                        (prev_cycle, (prev_step + 1).min(cap))
                    }
                }
            };
            assert!(
                (1..=cap).contains(&step),
                "cycle step {step} outside 1..={cap} at period {}",
                periods[i].period_id
            );
            periods[i].cycle_id = cycle_id;
            periods[i].cycle_step = step;
            periods[i].in_cycle = true;
            prev_fire = Some(i);
        }

        // Pass 2: outcomes, defined only once the following period exists.
        for i in 0..periods.len() {
            if !periods[i].should_fire || i + 1 >= periods.len() {
                continue;
            }
            let next_win = periods[i + 1].is_win;
            periods[i].fire_outcome_known = true;
            periods[i].fire_succeeded = next_win;

            if next_win {
                self.mark_cycle(periods, periods[i].cycle_id, true);
            } else if periods[i].cycle_step == cap {
                self.mark_cycle(periods, periods[i].cycle_id, false);
            }
        }

        for p in periods.iter() {
            assert!(
                !(p.cycle_complete && p.cycle_burst),
                "cycle {} both complete and burst at period {}",
                p.cycle_id,
                p.period_id
            );
        }
    }

    /// Mark every fire of a cycle completed (won) or burst (step cap missed).
    fn mark_cycle(&self, periods: &mut [Period], cycle_id: u32, complete: bool) {
        for p in periods.iter_mut() {
            if p.should_fire && p.cycle_id == cycle_id {
                p.cycle_complete = complete;
                p.cycle_burst = !complete;
            }
        }
    }
}
