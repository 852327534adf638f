//! Processor — owns the ordered history and drives the pipeline:
//! indicators, pattern detection, scoring, fire decision, cycle pass.
//!
//! Single-threaded and synchronous by design. Each derived value reads only
//! finalized data from strictly earlier periods; the one documented
//! exception is the fire-outcome backfill, which the cycle pass performs for
//! period `i - 1` once period `i` is known. Callers that want background
//! recomputation must serialize access themselves — a recompute either runs
//! to completion or its result is discarded whole.

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::cycle::{fire_gate, CycleAssigner};
use crate::domain::{CandidatePool, Period};
use crate::scoring::ScoringEngine;
use crate::{fingerprint, indicators, patterns};

/// Per-record ingestion failures. Fatal to the single record, never to the
/// run: history is untouched when one of these is returned.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("period id '{0}' is not a numeric string")]
    InvalidPeriodId(String),

    #[error("duplicate period id '{0}'")]
    DuplicatePeriodId(String),

    #[error("period id '{id}' does not follow last ingested id '{last}'")]
    NonMonotonicPeriodId { id: String, last: String },

    #[error("empty draw number for period '{0}'")]
    EmptyDrawNumber(String),
}

pub struct Processor {
    config: EngineConfig,
    scoring: ScoringEngine,
    assigner: CycleAssigner,
    pool: CandidatePool,
    history: Vec<Period>,
}

impl Processor {
    /// Processor with the default rule catalogue and an empty pool.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rules(config, ScoringEngine::with_default_rules())
    }

    /// Processor with an injected scoring engine (tests use this to force
    /// deterministic fire behavior).
    pub fn with_rules(config: EngineConfig, scoring: ScoringEngine) -> Result<Self, ConfigError> {
        config.validate()?;
        let assigner = CycleAssigner::new(config.cycle_length);
        Ok(Self {
            config,
            scoring,
            assigner,
            pool: CandidatePool::empty(),
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    /// Read-only view of the finalized history, ascending by period id.
    pub fn history(&self) -> &[Period] {
        &self.history
    }

    pub fn last_period_id(&self) -> Option<&str> {
        self.history.last().map(|p| p.period_id.as_str())
    }

    /// Replace the candidate pool.
    ///
    /// Win status of already-finalized periods is untouched; call
    /// [`Processor::recompute_all`] to re-judge history against the new pool.
    pub fn set_candidate_pool(&mut self, pool: CandidatePool) {
        log::info!("candidate pool replaced ({} values)", pool.len());
        self.pool = pool;
    }

    /// Generate and install a pseudo-random pool of `size` values.
    pub fn generate_random_pool(&mut self, size: usize, seed: u64) {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        let mut rng = StdRng::seed_from_u64(seed);
        self.set_candidate_pool(CandidatePool::random(size, &mut rng));
    }

    /// Ingest one new period.
    ///
    /// Computes indicators, patterns, score and the fire decision from
    /// finalized history only, appends, then reruns the cycle pass — which
    /// finalizes the previous fire's outcome now that this period's win
    /// status is known.
    pub fn append_period(&mut self, period_id: &str, draw_number: &str) -> Result<&Period, ProcessError> {
        self.validate_period_id(period_id)?;
        let draw_number = draw_number.trim();
        if draw_number.is_empty() {
            return Err(ProcessError::EmptyDrawNumber(period_id.to_string()));
        }

        let period = build_period(
            period_id,
            draw_number,
            &self.history,
            &self.pool,
            &self.scoring,
            &self.config,
        );
        log::debug!(
            "period {} ingested: win={} k={:.3} score={} fire={}",
            period.period_id,
            period.is_win,
            period.k_value,
            period.score,
            period.should_fire
        );
        self.history.push(period);
        self.assigner.assign(&mut self.history);
        Ok(self.history.last().expect("just pushed"))
    }

    /// Ingest a batch of `(period_id, draw_number)` records in order.
    ///
    /// Each record stands alone: a malformed or duplicate id rejects that
    /// record and the rest of the batch continues. Results align with the
    /// input order.
    pub fn append_batch<'a, I>(&mut self, records: I) -> Vec<Result<(), ProcessError>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        records
            .into_iter()
            .map(|(id, draw)| match self.append_period(id, draw) {
                Ok(_) => Ok(()),
                Err(e) => {
                    log::warn!("rejected record '{id}': {e}");
                    Err(e)
                }
            })
            .collect()
    }

    /// Full deterministic recomputation over the entire history.
    ///
    /// Resets every derived field, re-judges wins against the *current*
    /// pool, replays indicators / patterns / scores / fire decisions forward
    /// and runs the cycle pass. The pass is then rerun and fingerprinted to
    /// verify the fixed point; a mismatch panics rather than persisting
    /// partially-consistent cycle data.
    pub fn recompute_all(&mut self) {
        log::info!("full recompute over {} periods", self.history.len());
        let mut rebuilt: Vec<Period> = Vec::with_capacity(self.history.len());
        for existing in &self.history {
            let period = build_period(
                &existing.period_id,
                &existing.draw_number,
                &rebuilt,
                &self.pool,
                &self.scoring,
                &self.config,
            );
            rebuilt.push(period);
        }
        self.assigner.assign(&mut rebuilt);

        let first = fingerprint::derived_state(&rebuilt);
        self.assigner.assign(&mut rebuilt);
        let second = fingerprint::derived_state(&rebuilt);
        assert_eq!(
            first, second,
            "cycle assignment failed to reach a fixed point"
        );

        self.history = rebuilt;
    }

    fn validate_period_id(&self, period_id: &str) -> Result<(), ProcessError> {
        if period_id.is_empty() || !period_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProcessError::InvalidPeriodId(period_id.to_string()));
        }
        if let Some(last) = self.last_period_id() {
            match numeric_cmp(period_id, last) {
                std::cmp::Ordering::Equal => {
                    return Err(ProcessError::DuplicatePeriodId(period_id.to_string()));
                }
                std::cmp::Ordering::Less => {
                    return Err(ProcessError::NonMonotonicPeriodId {
                        id: period_id.to_string(),
                        last: last.to_string(),
                    });
                }
                std::cmp::Ordering::Greater => {}
            }
        }
        Ok(())
    }
}

/// Compare two all-digit id strings by numeric value.
fn numeric_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Finalize one period against the finalized prefix.
///
/// Field order matters: win status feeds the K-value, which feeds the bands;
/// gap and pattern flags feed the score; the score feeds the fire gate.
fn build_period(
    period_id: &str,
    draw_number: &str,
    history: &[Period],
    pool: &CandidatePool,
    scoring: &ScoringEngine,
    config: &EngineConfig,
) -> Period {
    let mut p = Period::new(period_id, draw_number);
    p.is_win = pool.contains(&p.last3);

    let prev_k = history.last().map_or(0.0, |q| q.k_value);
    p.k_value = indicators::advance(prev_k, p.is_win);

    p.gap_value = patterns::gap_value(p.is_win, history);
    p.is_big_gap = patterns::is_big_gap(p.gap_value);

    let mut k_series: Vec<f64> = history.iter().map(|q| q.k_value).collect();
    k_series.push(p.k_value);
    p.bands = indicators::compute_bands(
        &k_series,
        config.bollinger_window,
        config.bollinger_multiplier,
    );

    let (win_streak, loss_streak) = patterns::streaks(p.is_win, history);
    p.win_streak = win_streak;
    p.loss_streak = loss_streak;

    p.is_confirm_point = patterns::confirm_point(&p, history);
    let (in_trend, trend_wins) = patterns::trend_segment(&p, history);
    p.is_trend_segment = in_trend;
    p.trend_segment_win_count = trend_wins;

    let (score, breakdown) = scoring.score(&p, history);
    p.score = score;
    p.score_breakdown = breakdown;
    p.should_fire = fire_gate(score, &p, history, config);

    p
}
