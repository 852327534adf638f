//! Period — one finalized draw result plus every derived field.

use serde::{Deserialize, Serialize};

/// Moving-average bands over the trailing K-values.
///
/// Absent (`None` on the period) until enough history exists — absence is a
/// normal state, not an error, and every band-dependent rule treats it as
/// "rule inapplicable".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// One line of a period's score breakdown.
///
/// Every rule is recorded, fired or not; a rule that did not fire carries
/// `delta = 0`. The breakdown order follows the engine's rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub rule_name: String,
    pub delta: i64,
    pub rationale: String,
    pub fired: bool,
}

/// One lottery draw event with all derived decision state.
///
/// `period_id`, `draw_number` and `last3` are the raw inputs; everything else
/// is derived and reset by a full recompute. Periods live in an
/// index-addressed slice ordered by ascending `period_id`; "backfill the
/// previous period's outcome" is a write to index `i - 1` while index `i` is
/// being processed, never an object-to-object pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub period_id: String,
    pub draw_number: String,
    /// Trailing 3 digits of the draw number, left-padded with zeros.
    pub last3: String,

    /// True iff `last3` was in the candidate pool when this period was
    /// finalized (or at the last full recompute).
    pub is_win: bool,
    /// Periods since the last win, counting this one; 0 on a winning period.
    pub gap_value: u32,
    pub k_value: f64,
    pub bands: Option<Bands>,

    /// `gap_value >= 2`.
    pub is_big_gap: bool,
    pub is_confirm_point: bool,
    pub is_trend_segment: bool,
    /// On-schedule wins counted since the latest big gap, whether or not the
    /// trend segment was declared.
    pub trend_segment_win_count: u32,
    pub win_streak: u32,
    pub loss_streak: u32,

    pub score: i64,
    pub score_breakdown: Vec<ScoreDetail>,
    pub should_fire: bool,

    /// Outcome fields, populated once the *next* period's result is known.
    pub fire_outcome_known: bool,
    pub fire_succeeded: bool,

    pub cycle_id: u32,
    /// Step within the cycle, 1..=N for fired periods, 0 otherwise.
    pub cycle_step: u32,
    pub in_cycle: bool,
    pub cycle_complete: bool,
    pub cycle_burst: bool,
}

impl Period {
    /// A fresh period with only the raw inputs set.
    pub fn new(period_id: impl Into<String>, draw_number: impl Into<String>) -> Self {
        let draw_number = draw_number.into();
        let last3 = last3_of(&draw_number);
        Self {
            period_id: period_id.into(),
            draw_number,
            last3,
            is_win: false,
            gap_value: 0,
            k_value: 0.0,
            bands: None,
            is_big_gap: false,
            is_confirm_point: false,
            is_trend_segment: false,
            trend_segment_win_count: 0,
            win_streak: 0,
            loss_streak: 0,
            score: 0,
            score_breakdown: Vec::new(),
            should_fire: false,
            fire_outcome_known: false,
            fire_succeeded: false,
            cycle_id: 0,
            cycle_step: 0,
            in_cycle: false,
            cycle_complete: false,
            cycle_burst: false,
        }
    }
}

/// Trailing 3 characters of a draw number, left-padded with '0' if shorter.
pub fn last3_of(draw_number: &str) -> String {
    let len = draw_number.chars().count();
    if len >= 3 {
        draw_number.chars().skip(len - 3).collect()
    } else {
        format!("{draw_number:0>3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last3_takes_trailing_digits() {
        assert_eq!(last3_of("000123"), "123");
        assert_eq!(last3_of("987"), "987");
    }

    #[test]
    fn last3_pads_short_numbers() {
        assert_eq!(last3_of("7"), "007");
        assert_eq!(last3_of("42"), "042");
        assert_eq!(last3_of(""), "000");
    }

    #[test]
    fn new_period_has_default_derived_state() {
        let p = Period::new("20240101001", "12345");
        assert_eq!(p.last3, "345");
        assert!(!p.is_win);
        assert!(p.bands.is_none());
        assert_eq!(p.cycle_step, 0);
        assert!(!p.cycle_complete && !p.cycle_burst);
    }

    #[test]
    fn period_serialization_roundtrip() {
        let mut p = Period::new("1001", "000123");
        p.k_value = 1.857;
        p.bands = Some(Bands {
            middle: 1.0,
            upper: 2.0,
            lower: 0.0,
        });
        let json = serde_json::to_string(&p).unwrap();
        let deser: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(p, deser);
    }
}
