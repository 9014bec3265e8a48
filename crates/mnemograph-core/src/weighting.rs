//! # Weighting Rules
//!
//! Turns one similarity observation between two assets into the values that
//! get folded into an edge.
//!
//! - `weight_modifier = (imp1*conf1 + imp2*conf2) / 200`, in `[0.01, 1.0]`
//! - `weight = similarity * weight_modifier`
//! - `link_type = Structural` iff `similarity > structural_threshold`
//!
//! Importance and confidence fall back to `DEFAULT_SCORE` when they are
//! missing, not numeric, or outside `[MIN_SCORE, MAX_SCORE]`.

use crate::primitives::{
    CONFIDENCE_KEY, DEFAULT_SCORE, DEFAULT_STRUCTURAL_THRESHOLD, IMPORTANCE_KEY, MAX_SCORE,
    MIN_SCORE, WEIGHT_MODIFIER_DIVISOR,
};
use crate::{Attributes, GraphError, LinkType};

// =============================================================================
// ASSET METADATA
// =============================================================================

/// Importance and confidence of one asset, already defaulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetMeta {
    pub importance: f64,
    pub confidence: f64,
}

impl Default for AssetMeta {
    fn default() -> Self {
        Self {
            importance: DEFAULT_SCORE,
            confidence: DEFAULT_SCORE,
        }
    }
}

impl AssetMeta {
    /// Read the scores from an asset's metadata mapping.
    #[must_use]
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            importance: score(attrs, IMPORTANCE_KEY),
            confidence: score(attrs, CONFIDENCE_KEY),
        }
    }

    fn product(self) -> f64 {
        self.importance * self.confidence
    }
}

fn score(attrs: &Attributes, key: &str) -> f64 {
    attrs
        .get(key)
        .and_then(|v| v.as_f64())
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        .unwrap_or(DEFAULT_SCORE)
}

// =============================================================================
// POLICY
// =============================================================================

/// The result of weighting one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedObservation {
    pub similarity: f64,
    pub weight_modifier: f64,
    pub weight: f64,
    pub link_type: LinkType,
}

/// Fixed weighting rules parameterized by the structural threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightingPolicy {
    structural_threshold: f64,
}

impl Default for WeightingPolicy {
    fn default() -> Self {
        Self {
            structural_threshold: DEFAULT_STRUCTURAL_THRESHOLD,
        }
    }
}

impl WeightingPolicy {
    /// Create a policy. The threshold must lie in `[0, 1]`.
    pub fn new(structural_threshold: f64) -> Result<Self, GraphError> {
        if !(0.0..=1.0).contains(&structural_threshold) {
            return Err(GraphError::InvalidInput(format!(
                "structural threshold {} outside [0, 1]",
                structural_threshold
            )));
        }
        Ok(Self {
            structural_threshold,
        })
    }

    /// The configured structural threshold.
    #[must_use]
    pub fn structural_threshold(&self) -> f64 {
        self.structural_threshold
    }

    /// Combined importance × confidence of both assets, normalized.
    #[must_use]
    pub fn weight_modifier(meta1: AssetMeta, meta2: AssetMeta) -> f64 {
        (meta1.product() + meta2.product()) / WEIGHT_MODIFIER_DIVISOR
    }

    /// Classify an observation. Equality with the threshold is associative.
    #[must_use]
    pub fn classify(&self, similarity: f64) -> LinkType {
        if similarity > self.structural_threshold {
            LinkType::Structural
        } else {
            LinkType::Associative
        }
    }

    /// Weight one observation between two assets.
    #[must_use]
    pub fn weigh(&self, similarity: f64, meta1: AssetMeta, meta2: AssetMeta) -> WeightedObservation {
        let weight_modifier = Self::weight_modifier(meta1, meta2);
        WeightedObservation {
            similarity,
            weight_modifier,
            weight: similarity * weight_modifier,
            link_type: self.classify(similarity),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttrValue;

    fn meta(importance: i64, confidence: i64) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(IMPORTANCE_KEY.to_string(), AttrValue::Int(importance));
        attrs.insert(CONFIDENCE_KEY.to_string(), AttrValue::Int(confidence));
        attrs
    }

    #[test]
    fn missing_scores_default_to_five() {
        let parsed = AssetMeta::from_attributes(&Attributes::new());
        assert_eq!(parsed, AssetMeta::default());
        assert_eq!(parsed.importance, 5.0);
    }

    #[test]
    fn out_of_range_scores_default_to_five() {
        let parsed = AssetMeta::from_attributes(&meta(0, 11));
        assert_eq!(parsed.importance, DEFAULT_SCORE);
        assert_eq!(parsed.confidence, DEFAULT_SCORE);
    }

    #[test]
    fn non_numeric_score_defaults_to_five() {
        let mut attrs = Attributes::new();
        attrs.insert(IMPORTANCE_KEY.to_string(), AttrValue::from("high"));
        attrs.insert(CONFIDENCE_KEY.to_string(), AttrValue::Float(7.5));

        let parsed = AssetMeta::from_attributes(&attrs);
        assert_eq!(parsed.importance, DEFAULT_SCORE);
        assert_eq!(parsed.confidence, 7.5);
    }

    #[test]
    fn modifier_bounds() {
        let low = AssetMeta::from_attributes(&meta(1, 1));
        let high = AssetMeta::from_attributes(&meta(10, 10));

        assert_eq!(WeightingPolicy::weight_modifier(low, low), 0.01);
        assert_eq!(WeightingPolicy::weight_modifier(high, high), 1.0);
        assert_eq!(
            WeightingPolicy::weight_modifier(AssetMeta::default(), AssetMeta::default()),
            0.25
        );
    }

    #[test]
    fn strong_observation_is_structural() {
        let policy = WeightingPolicy::new(0.8).expect("policy");
        let top = AssetMeta::from_attributes(&meta(10, 10));

        let obs = policy.weigh(0.9, top, top);
        assert_eq!(obs.weight_modifier, 1.0);
        assert_eq!(obs.weight, 0.9);
        assert_eq!(obs.link_type, LinkType::Structural);
    }

    #[test]
    fn threshold_is_strict() {
        let policy = WeightingPolicy::new(0.8).expect("policy");
        assert_eq!(policy.classify(0.8), LinkType::Associative);
        assert_eq!(policy.classify(0.81), LinkType::Structural);
    }

    #[test]
    fn policy_rejects_threshold_outside_unit_interval() {
        assert!(WeightingPolicy::new(1.5).is_err());
        assert!(WeightingPolicy::new(-0.1).is_err());
        assert!(WeightingPolicy::new(f64::NAN).is_err());
        assert!(WeightingPolicy::new(0.0).is_ok());
        assert!(WeightingPolicy::new(1.0).is_ok());
    }
}
