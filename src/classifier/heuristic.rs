//! Deterministic fallback scorer
//!
//! Used whenever no trained model is loaded or a model invocation faults.
//! Starts from a base risk and adds a fixed increment per triggered
//! condition; increments are additive and order-independent, clamping to
//! [0, 1] is the only non-linearity.

use crate::feature_extractor::FeatureVector;

const BASE_RISK: f64 = 0.3;

/// Rule-based risk scorer over the extracted feature vector
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a feature vector into a risk estimate in [0, 1].
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let mut risk = BASE_RISK;

        if features.total_risk_flags() >= 3.0 {
            risk += 0.3;
        }
        if features.debt_ratio() > 0.5 {
            risk += 0.2;
        }
        if features.is_unemployed() {
            risk += 0.3;
        }
        if features.major_banking_incidents() {
            risk += 0.25;
        }
        if features.job_stability_low() {
            risk += 0.15;
        }

        risk.clamp(0.0, 1.0)
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}
