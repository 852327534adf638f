//! Rule scoring — an ordered collection of independent, side-effect-free
//! scoring rules summed into a per-period total.
//!
//! Rules are trait objects in an injected list, so tests can evaluate each
//! rule in isolation or hand the engine a synthetic rule set. The engine
//! holds no mutable state: scoring the same `(period, history)` twice yields
//! an identical breakdown and total.

pub mod rules;

use crate::domain::{Period, ScoreDetail};

pub use rules::default_rules;

/// A named, pure scoring rule.
///
/// # Architecture invariant
/// Rules receive the period being finalized and the finalized prefix of
/// history, and must not mutate anything or read periods later than the
/// current one. `delta` defaults to a fixed magnitude when the rule applies;
/// rules with a magnitude-dependent delta (the gap penalty) override it.
pub trait ScoreRule: Send + Sync {
    /// Stable rule name, used as the breakdown key.
    fn name(&self) -> &str;

    /// Human-readable justification recorded in the breakdown.
    fn rationale(&self) -> &str;

    /// The fixed delta contributed when the rule applies.
    fn base_delta(&self) -> i64;

    fn applies(&self, current: &Period, history: &[Period]) -> bool;

    /// Delta contributed given the rule applies. Rules with a
    /// magnitude-dependent delta (the gap penalty) override this; the engine
    /// calls it only after a single `applies` check.
    fn delta_when_applicable(&self, _current: &Period, _history: &[Period]) -> i64 {
        self.base_delta()
    }

    fn delta(&self, current: &Period, history: &[Period]) -> i64 {
        if self.applies(current, history) {
            self.delta_when_applicable(current, history)
        } else {
            0
        }
    }
}

/// Evaluates an ordered rule list against a period.
///
/// Order affects only the recorded breakdown, never the total — deltas are
/// additive.
pub struct ScoringEngine {
    rules: Vec<Box<dyn ScoreRule>>,
}

impl ScoringEngine {
    pub fn new(rules: Vec<Box<dyn ScoreRule>>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Score one period against the finalized history.
    ///
    /// Every rule is recorded in the breakdown — non-firing rules with a
    /// delta of 0 — so the audit surface always shows the full catalogue.
    pub fn score(&self, current: &Period, history: &[Period]) -> (i64, Vec<ScoreDetail>) {
        let mut total = 0;
        let mut breakdown = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let fired = rule.applies(current, history);
            let delta = if fired {
                rule.delta_when_applicable(current, history)
            } else {
                0
            };
            total += delta;
            breakdown.push(ScoreDetail {
                rule_name: rule.name().to_string(),
                delta,
                rationale: rule.rationale().to_string(),
                fired,
            });
        }
        (total, breakdown)
    }
}
