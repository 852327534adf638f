//! Drawline Core — the draw-by-draw betting decision engine.
//!
//! This crate contains the whole rule-driven sequential pipeline:
//! - Domain types (periods, bands, score breakdowns, the candidate pool)
//! - Indicator layer: K-value oscillator and its moving-average bands
//! - Pattern detection: gaps, confirm points, trend segments, streaks
//! - Rule scoring with an ordered, injectable rule catalogue
//! - Fire gating and cycle bookkeeping (complete / burst)
//! - Processor orchestration: append, batch ingest, full recompute
//!
//! The core is single-threaded and synchronous: every derived value reads
//! only finalized data from strictly earlier periods, and the surrounding
//! application is responsible for serializing access during a recompute.

pub mod config;
pub mod cycle;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod patterns;
pub mod processor;
pub mod scoring;

pub use config::{ConfigError, EngineConfig};
pub use domain::{Bands, CandidatePool, Period, ScoreDetail};
pub use processor::{ProcessError, Processor};
