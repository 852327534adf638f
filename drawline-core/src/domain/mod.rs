//! Domain types: periods, bands, score breakdown lines, the candidate pool.

pub mod period;
pub mod pool;

pub use period::{last3_of, Bands, Period, ScoreDetail};
pub use pool::{CandidatePool, MAX_POOL_SIZE};
