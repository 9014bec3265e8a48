//! # Innate Primitives
//!
//! Hardcoded runtime constants for the mnemograph core.
//!
//! The weighting rules are compiled in. Only the structural threshold is
//! supplied by configuration, and it has a default here.

/// Metadata key holding an asset's importance score.
pub const IMPORTANCE_KEY: &str = "importance";

/// Metadata key holding an asset's confidence score.
pub const CONFIDENCE_KEY: &str = "confidence";

/// Node attribute key for a stream record's role.
pub const ROLE_KEY: &str = "role";

/// Node attribute key for a stream record's timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Lowest valid importance/confidence score.
pub const MIN_SCORE: f64 = 1.0;

/// Highest valid importance/confidence score.
pub const MAX_SCORE: f64 = 10.0;

/// Score used when importance or confidence is missing or outside
/// `[MIN_SCORE, MAX_SCORE]`.
pub const DEFAULT_SCORE: f64 = 5.0;

/// Divisor of the weight modifier: two products of at most 100 each.
///
/// `weight_modifier = (imp1*conf1 + imp2*conf2) / WEIGHT_MODIFIER_DIVISOR`
pub const WEIGHT_MODIFIER_DIVISOR: f64 = 200.0;

/// Default similarity cutoff above which an observation is structural.
pub const DEFAULT_STRUCTURAL_THRESHOLD: f64 = 0.8;

/// Magic bytes for the snapshot header.
///
/// - File Header = Magic Bytes ("MNEM") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"MNEM";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_divisor_normalizes_max_scores() {
        let max_product = MAX_SCORE * MAX_SCORE;
        assert_eq!((max_product + max_product) / WEIGHT_MODIFIER_DIVISOR, 1.0);
    }

    #[test]
    fn default_score_is_in_range() {
        assert!((MIN_SCORE..=MAX_SCORE).contains(&DEFAULT_SCORE));
        assert!((0.0..=1.0).contains(&DEFAULT_STRUCTURAL_THRESHOLD));
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"MNEM");
    }
}
