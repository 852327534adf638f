//! Content fingerprint of the derived history state.
//!
//! A BLAKE3 hash over the canonical JSON serialization of the period slice.
//! Two histories with byte-identical derived fields produce the same
//! fingerprint, which is what the recompute fixed-point check and the
//! idempotence tests compare.

use crate::domain::Period;

/// Hex fingerprint of every field of every period, raw inputs included.
pub fn derived_state(periods: &[Period]) -> String {
    let json = serde_json::to_vec(periods).expect("period serialization cannot fail");
    blake3::hash(&json).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_histories_share_a_fingerprint() {
        let a = vec![Period::new("1001", "123"), Period::new("1002", "456")];
        let b = a.clone();
        assert_eq!(derived_state(&a), derived_state(&b));
    }

    #[test]
    fn derived_field_change_alters_fingerprint() {
        let a = vec![Period::new("1001", "123")];
        let mut b = a.clone();
        b[0].score = 70;
        assert_ne!(derived_state(&a), derived_state(&b));
    }

    #[test]
    fn empty_history_fingerprints_consistently() {
        assert_eq!(derived_state(&[]), derived_state(&[]));
    }
}
