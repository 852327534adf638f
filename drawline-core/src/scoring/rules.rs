//! The rule catalogue.
//!
//! Deltas are fixed policy magnitudes and are reproduced exactly; changing
//! one changes the betting policy. `default_rules` returns the catalogue in
//! its canonical order, which is also the breakdown display order.

use crate::domain::{Bands, Period};

use super::ScoreRule;

/// "Touching" the upper band means the K-value is within this distance.
pub const UPPER_TOUCH_DISTANCE: f64 = 0.3;

/// Trailing periods inspected by the band-decline rules.
const BAND_DECLINE_LOOKBACK: usize = 5;

/// The full catalogue in canonical order.
pub fn default_rules() -> Vec<Box<dyn ScoreRule>> {
    vec![
        Box::new(KBelowMiddle),
        Box::new(TrendSegmentActive),
        Box::new(ConfirmPointNoTrend),
        Box::new(WinBetweenBigGaps),
        Box::new(GapPenalty),
        Box::new(ThreeBandsRising),
        Box::new(TwoBandsRising),
        Box::new(BandsDivergingAgainstTrend),
        Box::new(MiddleCrossNoUpperTouch),
        Box::new(NearUpperBand),
        Box::new(UpperBandDeclined),
        Box::new(TwoConsecutivePriorFires),
        Box::new(SecondFireOutsideConfirmWindow),
        Box::new(OpeningHorn),
    ]
}

// ─── Band helpers ────────────────────────────────────────────────────

/// Bands of the current period and the two immediately preceding ones.
/// `None` unless all three are present.
fn bands3<'a>(
    current: &'a Period,
    history: &'a [Period],
) -> Option<(&'a Bands, &'a Bands, &'a Bands)> {
    if history.len() < 2 {
        return None;
    }
    let cur = current.bands.as_ref()?;
    let prev1 = history[history.len() - 1].bands.as_ref()?;
    let prev2 = history[history.len() - 2].bands.as_ref()?;
    Some((cur, prev1, prev2))
}

fn rising(cur: f64, prev1: f64, prev2: f64) -> bool {
    cur > prev1 && prev1 > prev2
}

fn falling(cur: f64, prev1: f64, prev2: f64) -> bool {
    cur < prev1 && prev1 < prev2
}

/// Any adjacent decrease of `band` over the trailing `lookback` history
/// periods. Pairs with absent bands are skipped.
fn band_declined_recently(
    history: &[Period],
    lookback: usize,
    band: impl Fn(&Bands) -> f64,
) -> bool {
    if history.len() < 2 {
        return false;
    }
    let start = history.len() - lookback.min(history.len());
    history[start..].windows(2).any(|pair| {
        match (pair[0].bands.as_ref(), pair[1].bands.as_ref()) {
            (Some(a), Some(b)) => band(a) > band(b),
            _ => false,
        }
    })
}

/// True while a confirm point is "open": the current period is one, or the
/// most recent confirm point has seen no big gap since.
fn in_confirm_window(current: &Period, history: &[Period]) -> bool {
    if current.is_confirm_point {
        return true;
    }
    match history.iter().rposition(|p| p.is_confirm_point) {
        Some(cp) => !history[cp + 1..].iter().any(|p| p.is_big_gap),
        None => false,
    }
}

// ─── Catalogue ───────────────────────────────────────────────────────

/// K-value below the middle band: hard veto on betting.
pub struct KBelowMiddle;

impl ScoreRule for KBelowMiddle {
    fn name(&self) -> &str {
        "k_below_middle"
    }
    fn rationale(&self) -> &str {
        "K-value below the middle band; no bet while the oscillator is weak"
    }
    fn base_delta(&self) -> i64 {
        -1000
    }
    fn applies(&self, current: &Period, _history: &[Period]) -> bool {
        current
            .bands
            .as_ref()
            .is_some_and(|b| current.k_value < b.middle)
    }
}

/// An active trend segment disqualifies firing.
pub struct TrendSegmentActive;

impl ScoreRule for TrendSegmentActive {
    fn name(&self) -> &str {
        "trend_segment_active"
    }
    fn rationale(&self) -> &str {
        "trend segment formed; the on-schedule run is already priced in"
    }
    fn base_delta(&self) -> i64 {
        -500
    }
    fn applies(&self, current: &Period, _history: &[Period]) -> bool {
        current.is_trend_segment
    }
}

/// A confirm point before any trend segment has formed.
pub struct ConfirmPointNoTrend;

impl ScoreRule for ConfirmPointNoTrend {
    fn name(&self) -> &str {
        "confirm_point_no_trend"
    }
    fn rationale(&self) -> &str {
        "confirm point with no trend segment yet; the window to bet is open"
    }
    fn base_delta(&self) -> i64 {
        70
    }
    fn applies(&self, current: &Period, _history: &[Period]) -> bool {
        current.is_confirm_point && !current.is_trend_segment
    }
}

/// A win landing after two big-gap stretches are already on record.
///
/// The walk-back only needs the two most recent big-gap periods to exist;
/// the zero-or-one-gap texture between them is what makes the pattern strong,
/// and any winning period satisfies it by construction (its own gap is 0).
pub struct WinBetweenBigGaps;

impl ScoreRule for WinBetweenBigGaps {
    fn name(&self) -> &str {
        "win_between_big_gaps"
    }
    fn rationale(&self) -> &str {
        "win with two big gaps on record; the between-gaps rhythm is strong"
    }
    fn base_delta(&self) -> i64 {
        40
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        if !current.is_win {
            return false;
        }
        let Some(latest) = history.iter().rposition(|p| p.is_big_gap) else {
            return false;
        };
        latest > 0 && history[..latest].iter().any(|p| p.is_big_gap)
    }
}

/// Graduated penalty for a growing miss streak.
pub struct GapPenalty;

impl ScoreRule for GapPenalty {
    fn name(&self) -> &str {
        "gap_penalty"
    }
    fn rationale(&self) -> &str {
        "gap penalty: -30 at gap 2, -50 at gap 3, -100 at gap 4 and beyond"
    }
    fn base_delta(&self) -> i64 {
        -100
    }
    fn applies(&self, current: &Period, _history: &[Period]) -> bool {
        current.gap_value >= 2
    }
    fn delta_when_applicable(&self, current: &Period, _history: &[Period]) -> i64 {
        match current.gap_value {
            2 => -30,
            3 => -50,
            _ => -100,
        }
    }
}

/// Upper, middle and lower bands all strictly rising over two periods.
pub struct ThreeBandsRising;

impl ScoreRule for ThreeBandsRising {
    fn name(&self) -> &str {
        "three_bands_rising"
    }
    fn rationale(&self) -> &str {
        "all three bands rising over the last two periods"
    }
    fn base_delta(&self) -> i64 {
        80
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        let Some((cur, p1, p2)) = bands3(current, history) else {
            return false;
        };
        rising(cur.upper, p1.upper, p2.upper)
            && rising(cur.middle, p1.middle, p2.middle)
            && rising(cur.lower, p1.lower, p2.lower)
    }
}

/// Upper and middle bands rising, lower not — excludes the three-band case.
pub struct TwoBandsRising;

impl ScoreRule for TwoBandsRising {
    fn name(&self) -> &str {
        "two_bands_rising"
    }
    fn rationale(&self) -> &str {
        "upper and middle bands rising (lower band not)"
    }
    fn base_delta(&self) -> i64 {
        70
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        let Some((cur, p1, p2)) = bands3(current, history) else {
            return false;
        };
        rising(cur.upper, p1.upper, p2.upper)
            && rising(cur.middle, p1.middle, p2.middle)
            && !rising(cur.lower, p1.lower, p2.lower)
    }
}

/// Upper band falling while middle and lower rise on a winning period.
pub struct BandsDivergingAgainstTrend;

impl ScoreRule for BandsDivergingAgainstTrend {
    fn name(&self) -> &str {
        "bands_diverging_against_trend"
    }
    fn rationale(&self) -> &str {
        "upper band falling against rising middle/lower on a gap-0 period"
    }
    fn base_delta(&self) -> i64 {
        -50
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        let Some((cur, p1, p2)) = bands3(current, history) else {
            return false;
        };
        falling(cur.upper, p1.upper, p2.upper)
            && rising(cur.middle, p1.middle, p2.middle)
            && rising(cur.lower, p1.lower, p2.lower)
            && current.gap_value == 0
    }
}

/// K crossed above the middle band this period, gap is exactly 2, and the
/// K-value has not touched the upper band since the previous crossing.
pub struct MiddleCrossNoUpperTouch;

impl ScoreRule for MiddleCrossNoUpperTouch {
    fn name(&self) -> &str {
        "middle_cross_no_upper_touch"
    }
    fn rationale(&self) -> &str {
        "fresh cross above the middle band at gap 2, upper band untouched"
    }
    fn base_delta(&self) -> i64 {
        40
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        if history.len() < 2 {
            return false;
        }
        let Some(cur_bands) = current.bands.as_ref() else {
            return false;
        };
        if current.k_value < cur_bands.middle {
            return false;
        }
        // The previous period must sit below its middle band — a fresh cross.
        let prev = &history[history.len() - 1];
        let Some(prev_bands) = prev.bands.as_ref() else {
            return false;
        };
        if prev.k_value >= prev_bands.middle {
            return false;
        }

        // Walk back through the stretch above the middle band looking for an
        // upper-band touch; a period below the middle ends the stretch.
        let mut touched_upper = false;
        for p in history[..history.len() - 1].iter().rev() {
            let Some(b) = p.bands.as_ref() else {
                continue;
            };
            if p.k_value < b.middle {
                break;
            }
            if (p.k_value - b.upper).abs() <= UPPER_TOUCH_DISTANCE {
                touched_upper = true;
                break;
            }
        }

        !touched_upper && current.gap_value == 2
    }
}

/// K-value within touching distance of the upper band: overheated.
pub struct NearUpperBand;

impl ScoreRule for NearUpperBand {
    fn name(&self) -> &str {
        "near_upper_band"
    }
    fn rationale(&self) -> &str {
        "K-value within 0.3 of the upper band; reversal risk"
    }
    fn base_delta(&self) -> i64 {
        -300
    }
    fn applies(&self, current: &Period, _history: &[Period]) -> bool {
        let Some(bands) = current.bands.as_ref() else {
            return false;
        };
        let distance = bands.upper - current.k_value;
        (0.0..=UPPER_TOUCH_DISTANCE).contains(&distance)
    }
}

/// The upper band declined somewhere in the trailing five periods.
pub struct UpperBandDeclined;

impl ScoreRule for UpperBandDeclined {
    fn name(&self) -> &str {
        "upper_band_declined"
    }
    fn rationale(&self) -> &str {
        "upper band declined within the trailing five periods"
    }
    fn base_delta(&self) -> i64 {
        -50
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        if current.bands.is_none() {
            return false;
        }
        band_declined_recently(history, BAND_DECLINE_LOOKBACK, |b| b.upper)
    }
}

/// Both immediately preceding periods fired: mandatory one-period pause.
pub struct TwoConsecutivePriorFires;

impl ScoreRule for TwoConsecutivePriorFires {
    fn name(&self) -> &str {
        "two_consecutive_prior_fires"
    }
    fn rationale(&self) -> &str {
        "two consecutive fires already; a pause period is mandatory"
    }
    fn base_delta(&self) -> i64 {
        -1000
    }
    fn applies(&self, _current: &Period, history: &[Period]) -> bool {
        history.len() >= 2
            && history[history.len() - 1].should_fire
            && history[history.len() - 2].should_fire
    }
}

/// A second consecutive fire attempted outside an open confirm window (or
/// with a trend segment active).
pub struct SecondFireOutsideConfirmWindow;

impl ScoreRule for SecondFireOutsideConfirmWindow {
    fn name(&self) -> &str {
        "second_fire_outside_confirm_window"
    }
    fn rationale(&self) -> &str {
        "second consecutive fire without an open confirm window backing it"
    }
    fn base_delta(&self) -> i64 {
        -500
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        let Some(prev) = history.last() else {
            return false;
        };
        if !prev.should_fire {
            return false;
        }
        if current.is_trend_segment {
            return true;
        }
        // Only meaningful when this period could otherwise fire.
        let k_above_middle = current
            .bands
            .as_ref()
            .is_some_and(|b| current.k_value >= b.middle);
        if !k_above_middle {
            return false;
        }
        !in_confirm_window(current, history)
    }
}

/// Opening horn: bands fanning out with a non-declining middle band.
pub struct OpeningHorn;

impl ScoreRule for OpeningHorn {
    fn name(&self) -> &str {
        "opening_horn"
    }
    fn rationale(&self) -> &str {
        "bands fanning out with the middle band holding; strongest entry"
    }
    fn base_delta(&self) -> i64 {
        1500
    }
    fn applies(&self, current: &Period, history: &[Period]) -> bool {
        let Some((cur, p1, _p2)) = bands3(current, history) else {
            return false;
        };
        let fanning_out = cur.upper > p1.upper && cur.middle > p1.middle && cur.lower < p1.lower;
        fanning_out && !band_declined_recently(history, BAND_DECLINE_LOOKBACK, |b| b.middle)
    }
}
