//! Engine configuration — injected at Processor construction, never ambient.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable engine parameters.
///
/// The core never reads these from disk or environment; the surrounding
/// application deserializes them (TOML in the CLI) and hands them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attempts per cycle before it bursts. Must be >= 3.
    pub cycle_length: u32,
    /// Minimum score for the fire gate.
    pub fire_score_threshold: i64,
    /// Trailing K-value window for the bands.
    pub bollinger_window: usize,
    /// Standard-deviation multiplier for the upper/lower bands.
    pub bollinger_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_length: 8,
            fire_score_threshold: 70,
            bollinger_window: 20,
            bollinger_multiplier: 2.0,
        }
    }
}

/// Rejected configuration values. Invalid configs fail construction rather
/// than being silently repaired.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cycle length must be at least 3 (got {0})")]
    CycleLengthTooShort(u32),

    #[error("bollinger window must be at least 2 (got {0})")]
    BollingerWindowTooShort(usize),

    #[error("bollinger multiplier must be finite and positive (got {0})")]
    BadBollingerMultiplier(f64),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_length < 3 {
            return Err(ConfigError::CycleLengthTooShort(self.cycle_length));
        }
        if self.bollinger_window < 2 {
            return Err(ConfigError::BollingerWindowTooShort(self.bollinger_window));
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier <= 0.0 {
            return Err(ConfigError::BadBollingerMultiplier(self.bollinger_multiplier));
        }
        Ok(())
    }
}
