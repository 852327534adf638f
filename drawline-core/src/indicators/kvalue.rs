//! K-value — the cumulative win/loss oscillator.

/// Added to the running K-value on a winning period.
pub const WIN_STEP: f64 = 1.857;

/// Added to the running K-value on a losing period.
pub const LOSS_STEP: f64 = -1.0;

/// Advance the oscillator by one period. The series starts at 0 and is never
/// clamped; a long losing run drives it arbitrarily negative.
pub fn advance(prev_k: f64, is_win: bool) -> f64 {
    if is_win {
        prev_k + WIN_STEP
    } else {
        prev_k + LOSS_STEP
    }
}
