//! Per-pipeline risk verdicts
//!
//! Each assessment pipeline emits one independent verdict; the fusion engine
//! reconciles the two. Verdicts are immutable once produced and are embedded
//! verbatim in the fused decision for audit replay.

use serde::{Deserialize, Serialize};

/// Binary outcome of a single pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Reject,
}

/// Coarse risk bucket derived from the default probability
///
/// Thresholds are fixed: < 0.3 low, < 0.6 medium, otherwise high
/// (upper-bound exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            RiskBucket::Low
        } else if probability < 0.6 {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }
}

/// Which scoring path produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictSource {
    Model,
    Heuristic,
}

/// Structured-feature classifier verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    /// Estimated default probability, 0.0 - 1.0, rounded to 3 decimals
    pub probability: f64,
    pub bucket: RiskBucket,
    pub decision: Decision,
    /// MODEL when the trained artifact answered, HEURISTIC otherwise
    pub source: VerdictSource,
    /// Number of features consumed, for audit
    pub feature_count: usize,
}

/// Operating mode reported by the qualitative pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineMode {
    Normal,
    /// Certain fraud signal: overrides everything
    FraudStop,
    /// No comparable case history exists for the qualitative side
    ColdStart,
}

/// Verdict of the retrieval-augmented qualitative pipeline
///
/// Produced by external collaborators (retrieval, fraud, traditional-risk
/// and scenario agents); opaque to this core beyond the fields below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeVerdict {
    pub decision: Decision,
    /// Confidence 0.0 - 1.0; when absent the fusion engine applies the
    /// mode-specific default (0.9 in FRAUD_STOP, 0.5 in NORMAL)
    pub confidence: Option<f64>,
    pub mode: PipelineMode,
    /// Acceptance conditions attached by the qualitative side
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Similarity of the closest retrieved historical case
    pub top_similarity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_thresholds_are_upper_bound_exclusive() {
        assert_eq!(RiskBucket::from_probability(0.0), RiskBucket::Low);
        assert_eq!(RiskBucket::from_probability(0.29), RiskBucket::Low);
        assert_eq!(RiskBucket::from_probability(0.3), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_probability(0.59), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_probability(0.6), RiskBucket::High);
        assert_eq!(RiskBucket::from_probability(1.0), RiskBucket::High);
    }

    #[test]
    fn test_verdict_serialization() {
        let verdict = RiskVerdict {
            probability: 0.42,
            bucket: RiskBucket::Medium,
            decision: Decision::Accept,
            source: VerdictSource::Heuristic,
            feature_count: 44,
        };

        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"HEURISTIC\""));
        assert!(json.contains("\"ACCEPT\""));

        let back: RiskVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verdict);
    }

    #[test]
    fn test_qualitative_verdict_defaults() {
        let json = r#"{"decision":"REJECT","confidence":null,"mode":"FRAUD_STOP","top_similarity":null}"#;
        let verdict: QualitativeVerdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.mode, PipelineMode::FraudStop);
        assert!(verdict.conditions.is_empty());
    }
}
