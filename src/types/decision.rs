//! Fused decision data structures
//!
//! The fused decision is the terminal artifact of the pipeline: one bounded,
//! explainable outcome per application, never mutated after construction.
//! Fusing identical verdicts yields an identical artifact; the generated
//! decision id and emission timestamp live in the wire envelope stamped at
//! publication time, not in the decision itself.

use crate::types::verdict::{Decision, QualitativeVerdict, RiskVerdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why the final decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    FraudDetected,
    ColdStartMlDecision,
    BothPipelinesAgreeAccept,
    BothPipelinesAgreeReject,
    PipelinesDisagree,
}

/// Operating mode recorded on the fused decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FusionMode {
    Normal,
    FraudStop,
    ColdStart,
    ManualReviewRequired,
}

/// Follow-up routing attached to override outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpAction {
    SendToInvestigation,
}

/// Both sides of a pipeline disagreement, recorded for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub ml_decision: Decision,
    pub qualitative_decision: Decision,
    /// `1 - probability` of the classifier, rounded to 2 decimals
    pub ml_confidence: f64,
    pub qualitative_confidence: f64,
}

/// Final reconciled decision for one application
///
/// Pure function of the two source verdicts: carries no generated
/// identifiers, so identical inputs serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedDecision {
    /// Application case this decision belongs to
    pub case_id: String,

    pub final_decision: Decision,
    pub reason: ReasonCode,

    /// Calibrated confidence 0.0 - 1.0, rounded to 2 decimals
    pub confidence: f64,

    pub mode: FusionMode,

    /// Acceptance conditions carried forward from the qualitative side
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,

    /// Source verdicts embedded verbatim for audit replay
    pub ml_assessment: RiskVerdict,
    pub qualitative_assessment: QualitativeVerdict,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub human_validation_required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_details: Option<ConflictDetail>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FollowUpAction>,
}

/// Wire envelope around a fused decision
///
/// The decision id and emission timestamp are assigned here, at
/// publication, keeping [`FusedDecision`] itself deterministic. Serializes
/// flat so downstream consumers see one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEnvelope {
    /// Unique decision identifier
    pub decision_id: String,

    /// Decision emission timestamp
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub decision: FusedDecision,
}

impl DecisionEnvelope {
    /// Stamp a decision for emission
    pub fn new(decision: FusedDecision) -> Self {
        Self {
            decision_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::verdict::{PipelineMode, RiskBucket, VerdictSource};

    fn sample_decision() -> FusedDecision {
        FusedDecision {
            case_id: "case_42".to_string(),
            final_decision: Decision::Accept,
            reason: ReasonCode::BothPipelinesAgreeAccept,
            confidence: 0.85,
            mode: FusionMode::Normal,
            conditions: vec!["PROOF_OF_INCOME".to_string()],
            ml_assessment: RiskVerdict {
                probability: 0.1,
                bucket: RiskBucket::Low,
                decision: Decision::Accept,
                source: VerdictSource::Model,
                feature_count: 44,
            },
            qualitative_assessment: QualitativeVerdict {
                decision: Decision::Accept,
                confidence: Some(0.8),
                mode: PipelineMode::Normal,
                conditions: vec!["PROOF_OF_INCOME".to_string()],
                top_similarity: Some(0.91),
            },
            human_validation_required: false,
            conflict_details: None,
            action: None,
        }
    }

    #[test]
    fn test_fused_decision_serialization() {
        let decision = sample_decision();
        let json = serde_json::to_string(&decision).unwrap();
        let back: FusedDecision = serde_json::from_str(&json).unwrap();

        assert_eq!(back.final_decision, Decision::Accept);
        assert_eq!(back.reason, ReasonCode::BothPipelinesAgreeAccept);
        assert_eq!(back.ml_assessment, decision.ml_assessment);
        assert_eq!(back.qualitative_assessment, decision.qualitative_assessment);
    }

    #[test]
    fn test_optional_fields_omitted_on_wire() {
        let decision = sample_decision();
        let json = serde_json::to_string(&decision).unwrap();
        assert!(!json.contains("conflict_details"));
        assert!(!json.contains("human_validation_required"));
        assert!(!json.contains("\"action\""));
    }

    #[test]
    fn test_envelope_serializes_flat() {
        let envelope = DecisionEnvelope::new(sample_decision());
        let json = serde_json::to_string(&envelope).unwrap();

        assert!(json.contains("\"decision_id\""));
        assert!(json.contains("\"timestamp\""));
        // Flattened, not nested under a "decision" key.
        assert!(!json.contains("\"decision\":{"));
        assert!(json.contains("\"final_decision\":\"ACCEPT\""));

        let back: DecisionEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decision, envelope.decision);
        assert_eq!(back.decision_id, envelope.decision_id);
    }
}
