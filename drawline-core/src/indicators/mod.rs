//! Per-period technical indicators: the K-value oscillator and its bands.
//!
//! Both are pure functions of prior period values; the Processor feeds them
//! the finalized prefix of history plus the current period's win status.

pub mod bollinger;
pub mod kvalue;

pub use bollinger::compute_bands;
pub use kvalue::{advance, LOSS_STEP, WIN_STEP};
