//! Pattern detection over the indicator history.
//!
//! Every function takes the period being finalized (a draft with the earlier
//! fields already set) plus the finalized prefix of history, and never reads
//! a period later than the one being computed. The one place future data
//! flows backwards — fire-outcome backfill — lives in the cycle pass, not
//! here.

use crate::domain::Period;

/// Gap value at or above this is a "big gap".
pub const BIG_GAP_THRESHOLD: u32 = 2;

/// A period with gap value at or below this is "on schedule".
pub const ON_SCHEDULE_GAP: u32 = 1;

/// Wins inside the post-big-gap window needed to declare a trend segment.
const TREND_SEGMENT_WIN_COUNT: usize = 4;

/// On-schedule periods after a big gap that also declare a trend segment.
const TREND_SEGMENT_PERIOD_COUNT: usize = 5;

/// A confirm point must land within this many periods of the first win after
/// the big gap (inclusive).
const CONFIRM_WINDOW: usize = 2;

/// Periods since the last win, counting the current period; 0 on a win.
///
/// With no prior win on record, a losing period's gap equals the number of
/// prior periods — so the very first period has gap 0 either way.
pub fn gap_value(is_win: bool, history: &[Period]) -> u32 {
    if is_win || history.is_empty() {
        return 0;
    }
    match history.iter().rposition(|p| p.is_win) {
        Some(last_win) => (history.len() - last_win) as u32,
        None => history.len() as u32,
    }
}

pub fn is_big_gap(gap: u32) -> bool {
    gap >= BIG_GAP_THRESHOLD
}

/// Run-length counters, reset whenever the win/loss status flips.
pub fn streaks(is_win: bool, history: &[Period]) -> (u32, u32) {
    let prev = history.last();
    if is_win {
        let streak = match prev {
            Some(p) if p.is_win => p.win_streak + 1,
            _ => 1,
        };
        (streak, 0)
    } else {
        let streak = match prev {
            Some(p) if !p.is_win => p.loss_streak + 1,
            _ => 1,
        };
        (0, streak)
    }
}

/// Confirm point: a win shortly after a big gap that re-establishes an
/// on-schedule winning pattern.
///
/// Requires, walking the history: a most recent big-gap period B, the first
/// win W after B, the current (winning) period within [`CONFIRM_WINDOW`]
/// periods of W inclusive, and every winning period from W through the
/// current one on schedule (gap <= 1).
///
/// `current` must already have `is_win` and `gap_value` set.
pub fn confirm_point(current: &Period, history: &[Period]) -> bool {
    if !current.is_win || history.is_empty() {
        return false;
    }

    let Some(big_gap) = history.iter().rposition(|p| p.is_big_gap) else {
        return false;
    };
    let Some(first_win) = history[big_gap + 1..]
        .iter()
        .position(|p| p.is_win)
        .map(|offset| big_gap + 1 + offset)
    else {
        return false;
    };

    // Current sits at index history.len(); distance from the first win,
    // exclusive of the first win itself.
    let periods_since_first_win = history.len() - first_win;
    if current.gap_value > ON_SCHEDULE_GAP || periods_since_first_win > CONFIRM_WINDOW {
        return false;
    }

    history[first_win..]
        .iter()
        .filter(|p| p.is_win)
        .all(|p| p.gap_value <= ON_SCHEDULE_GAP)
}

/// Trend segment: a sustained on-schedule winning pattern after a big gap.
///
/// Returns `(declared, wins_after_gap)`. The win count is recorded on the
/// period whether or not the segment is declared; a big-gap period (or a
/// history with no big gap) resets both.
pub fn trend_segment(current: &Period, history: &[Period]) -> (bool, u32) {
    if current.is_big_gap || history.is_empty() {
        return (false, 0);
    }
    let Some(big_gap) = history.iter().rposition(|p| p.is_big_gap) else {
        return (false, 0);
    };

    let window = &history[big_gap + 1..];
    let mut wins_after_gap = window
        .iter()
        .filter(|p| p.is_win && p.gap_value <= ON_SCHEDULE_GAP)
        .count();
    if current.is_win && current.gap_value <= ON_SCHEDULE_GAP {
        wins_after_gap += 1;
    }

    let on_schedule = current.gap_value <= ON_SCHEDULE_GAP;
    let mut periods_in_window = window
        .iter()
        .filter(|p| p.gap_value <= ON_SCHEDULE_GAP)
        .count();
    if on_schedule {
        periods_in_window += 1;
    }

    let declared = on_schedule
        && (wins_after_gap >= TREND_SEGMENT_WIN_COUNT
            || periods_in_window >= TREND_SEGMENT_PERIOD_COUNT);
    (declared, wins_after_gap as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a finalized history from a win/loss pattern, deriving gap
    /// values and big-gap flags the way the Processor would.
    fn history_from(wins: &[bool]) -> Vec<Period> {
        let mut periods: Vec<Period> = Vec::with_capacity(wins.len());
        for (i, &w) in wins.iter().enumerate() {
            let mut p = Period::new(format!("{}", 1000 + i), "000");
            p.is_win = w;
            p.gap_value = gap_value(w, &periods);
            p.is_big_gap = is_big_gap(p.gap_value);
            let (ws, ls) = streaks(w, &periods);
            p.win_streak = ws;
            p.loss_streak = ls;
            periods.push(p);
        }
        periods
    }

    fn draft(is_win: bool, history: &[Period]) -> Period {
        let mut p = Period::new("9999", "000");
        p.is_win = is_win;
        p.gap_value = gap_value(is_win, history);
        p.is_big_gap = is_big_gap(p.gap_value);
        p
    }

    #[test]
    fn first_period_gap_is_zero() {
        assert_eq!(gap_value(true, &[]), 0);
        assert_eq!(gap_value(false, &[]), 0);
    }

    #[test]
    fn gap_after_win_is_zero_then_counts_up() {
        let history = history_from(&[true]);
        assert_eq!(gap_value(false, &history), 1);

        let history = history_from(&[true, false, false]);
        // Two losses since the win, plus the current losing period.
        assert_eq!(gap_value(false, &history), 3);
        assert_eq!(gap_value(true, &history), 0);
    }

    #[test]
    fn gap_with_no_prior_win_counts_all_prior_periods() {
        let history = history_from(&[false, false, false]);
        assert_eq!(gap_value(false, &history), 3);
    }

    #[test]
    fn gap_increments_by_one_after_a_losing_predecessor() {
        let history = history_from(&[true, false, false, false]);
        let prev_gap = history.last().unwrap().gap_value;
        assert_eq!(gap_value(false, &history), prev_gap + 1);
    }

    #[test]
    fn big_gap_threshold() {
        assert!(!is_big_gap(0));
        assert!(!is_big_gap(1));
        assert!(is_big_gap(2));
        assert!(is_big_gap(7));
    }

    #[test]
    fn streaks_reset_on_flip() {
        let history = history_from(&[true, true, false]);
        assert_eq!(history[1].win_streak, 2);
        assert_eq!(history[2].loss_streak, 1);
        assert_eq!(streaks(true, &history), (1, 0));
        assert_eq!(streaks(false, &history), (0, 2));
    }

    #[test]
    fn confirm_point_needs_big_gap_then_prompt_wins() {
        // W L L (big gap) W . — the win right after the gap is W; a win one
        // period later is within the confirm window and on schedule.
        let history = history_from(&[true, false, false, true]);
        assert!(history[2].is_big_gap);
        let current = draft(true, &history);
        assert!(confirm_point(&current, &history));
    }

    #[test]
    fn confirm_point_false_without_big_gap() {
        let history = history_from(&[true, true, true]);
        let current = draft(true, &history);
        assert!(!confirm_point(&current, &history));
    }

    #[test]
    fn confirm_point_false_on_losing_period() {
        let history = history_from(&[true, false, false, true]);
        let current = draft(false, &history);
        assert!(!confirm_point(&current, &history));
    }

    #[test]
    fn confirm_point_false_outside_window() {
        // Big gap, first win, then two more periods: the current period is 3
        // past the first win — outside the 2-period window.
        let history = history_from(&[true, false, false, true, true, true]);
        let current = draft(true, &history);
        assert!(!confirm_point(&current, &history));
    }

    #[test]
    fn confirm_point_false_when_no_win_after_gap() {
        let history = history_from(&[true, false, false]);
        let current = draft(true, &history);
        // The current win is the first after the gap; there is no prior W to
        // confirm against.
        assert!(!confirm_point(&current, &history));
    }

    #[test]
    fn trend_segment_declared_after_four_on_schedule_wins() {
        // Big gap, then alternating on-schedule wins.
        let history = history_from(&[true, false, false, true, true, true]);
        let current = draft(true, &history);
        let (declared, wins) = trend_segment(&current, &history);
        assert!(declared);
        assert_eq!(wins, 4);
    }

    #[test]
    fn trend_segment_declared_on_five_on_schedule_periods() {
        // Big gap, then W L W L — four on-schedule periods but only two
        // wins. The current on-schedule win makes five periods with three
        // wins: declared via the period count, not the win count.
        let history = history_from(&[true, false, false, true, false, true, false]);
        let current = draft(true, &history);
        assert_eq!(current.gap_value, 0);
        let (declared, wins) = trend_segment(&current, &history);
        assert!(declared);
        assert_eq!(wins, 3);
    }

    #[test]
    fn trend_segment_reset_by_big_gap() {
        let history = history_from(&[true, false, false, true, true, true]);
        let mut current = draft(false, &history);
        current.gap_value = 2;
        current.is_big_gap = true;
        assert_eq!(trend_segment(&current, &history), (false, 0));
    }

    #[test]
    fn trend_segment_counts_wins_even_when_not_declared() {
        let history = history_from(&[true, false, false, true]);
        let current = draft(true, &history);
        let (declared, wins) = trend_segment(&current, &history);
        assert!(!declared);
        assert_eq!(wins, 2);
    }

    #[test]
    fn trend_segment_false_without_big_gap() {
        let history = history_from(&[true, true, true, true, true]);
        let current = draft(true, &history);
        assert_eq!(trend_segment(&current, &history), (false, 0));
    }
}
