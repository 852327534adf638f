//! Bollinger bands over the K-value series.
//!
//! Middle = SMA over the trailing `window` values (the current K included);
//! upper/lower = middle +/- mult * population stddev (divide by N).
//! Absent until `window` values exist.

use crate::domain::Bands;

/// Compute the bands over the trailing `window` entries of `k_history`.
///
/// `k_history` must end with the K-value of the period being finalized.
/// Returns `None` while fewer than `window` values exist — callers treat
/// absence as "bands not yet defined", never as an error.
pub fn compute_bands(k_history: &[f64], window: usize, multiplier: f64) -> Option<Bands> {
    if window == 0 || k_history.len() < window {
        return None;
    }

    let tail = &k_history[k_history.len() - window..];
    let mean = tail.iter().sum::<f64>() / window as f64;

    // Population stddev
    let variance = tail
        .iter()
        .map(|k| {
            let diff = k - mean;
            diff * diff
        })
        .sum::<f64>()
        / window as f64;
    let stddev = variance.sqrt();

    Some(Bands {
        middle: mean,
        upper: mean + multiplier * stddev,
        lower: mean - multiplier * stddev,
    })
}
