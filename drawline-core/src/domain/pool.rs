//! Candidate pool — the ordered set of last-3 values that count as a win.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hard cap on pool size.
pub const MAX_POOL_SIZE: usize = 350;

/// Ordered, duplicate-free set of up to [`MAX_POOL_SIZE`] three-digit strings
/// ("000".."999") used as the win predicate.
///
/// An empty pool is a valid steady state: no period ever wins, and fire
/// decisions stay gated on the band condition regardless of score.
///
/// Replacing the pool never retroactively changes `is_win` on finalized
/// periods; only an explicit full recompute re-judges history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    values: Vec<String>,
}

impl CandidatePool {
    /// Pool with no members.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Generate `size` distinct pseudo-random three-digit values.
    ///
    /// Callers pass a seeded RNG when reproducibility matters; `size` is
    /// capped at [`MAX_POOL_SIZE`] (and at the 1000 possible values).
    pub fn random<R: Rng>(size: usize, rng: &mut R) -> Self {
        let target = size.min(MAX_POOL_SIZE);
        let mut seen = HashSet::with_capacity(target);
        let mut values = Vec::with_capacity(target);
        while values.len() < target {
            let n: u16 = rng.gen_range(0..1000);
            let candidate = format!("{n:03}");
            if seen.insert(candidate.clone()) {
                values.push(candidate);
            }
        }
        Self { values }
    }

    /// Build a pool from manually supplied tokens.
    ///
    /// Tokens are normalized the way the manual-entry surface expects:
    /// left-padded with zeros to 3 digits, truncated to the trailing 3 if
    /// longer. Non-numeric tokens are skipped with a warning, duplicates keep
    /// their first position, and the result is capped at [`MAX_POOL_SIZE`].
    pub fn from_values<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for token in tokens {
            if values.len() >= MAX_POOL_SIZE {
                break;
            }
            let raw = token.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            if !raw.chars().all(|c| c.is_ascii_digit()) {
                log::warn!("skipping non-numeric pool token '{raw}'");
                continue;
            }
            let normalized = crate::domain::last3_of(raw);
            if seen.insert(normalized.clone()) {
                values.push(normalized);
            }
        }
        Self { values }
    }

    pub fn contains(&self, last3: &str) -> bool {
        self.values.iter().any(|v| v == last3)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}
