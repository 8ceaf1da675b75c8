//! End-to-end application processing
//!
//! Runs both assessment pipelines over one application record and fuses
//! their verdicts. Processing is synchronous and stateless per request; the
//! classifier's loaded model is the only process-lifetime state.

use crate::classifier::RiskClassifier;
use crate::feature_extractor::FeatureExtractor;
use crate::fusion::DecisionFusionEngine;
use crate::qualitative::{ClientProfile, QualitativeAssessor};
use crate::types::decision::FusedDecision;
use crate::types::ApplicationRecord;
use tracing::{debug, info};

/// Dual-pipeline evaluation of credit applications
pub struct DecisionPipeline {
    extractor: FeatureExtractor,
    classifier: RiskClassifier,
    assessor: Box<dyn QualitativeAssessor>,
    fusion: DecisionFusionEngine,
}

impl DecisionPipeline {
    pub fn new(classifier: RiskClassifier, assessor: Box<dyn QualitativeAssessor>) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            classifier,
            assessor,
            fusion: DecisionFusionEngine::new(),
        }
    }

    /// Process one application end to end.
    ///
    /// Guaranteed to produce a decision: no fault in extraction, scoring or
    /// fusion propagates past this call.
    pub fn process(&self, record: &ApplicationRecord) -> FusedDecision {
        let case_id = record.case_id();

        let features = self.extractor.extract(record);
        debug!(case_id = %case_id, feature_count = features.len(), "Features extracted");

        let ml_verdict = self.classifier.score(&features);
        debug!(
            case_id = %case_id,
            probability = ml_verdict.probability,
            bucket = ?ml_verdict.bucket,
            source = ?ml_verdict.source,
            "Classifier verdict"
        );

        let profile = ClientProfile::from_record(record);
        let qualitative_verdict = self.assessor.assess(&profile, record);
        debug!(
            case_id = %case_id,
            mode = ?qualitative_verdict.mode,
            decision = ?qualitative_verdict.decision,
            "Qualitative verdict"
        );

        let decision = self.fusion.fuse(case_id, &ml_verdict, &qualitative_verdict);

        info!(
            case_id = %case_id,
            final_decision = ?decision.final_decision,
            confidence = decision.confidence,
            mode = ?decision.mode,
            "Application processed"
        );

        decision
    }

    /// Whether the classifier runs with a trained model
    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_model_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualitative::ColdStartAssessor;
    use crate::types::decision::{FusionMode, ReasonCode};
    use crate::types::verdict::{Decision, PipelineMode, QualitativeVerdict};

    /// Stub collaborator with a canned verdict
    struct FixedAssessor(QualitativeVerdict);

    impl QualitativeAssessor for FixedAssessor {
        fn assess(&self, _: &ClientProfile, _: &ApplicationRecord) -> QualitativeVerdict {
            self.0.clone()
        }
    }

    fn pipeline_with(verdict: QualitativeVerdict) -> DecisionPipeline {
        DecisionPipeline::new(
            RiskClassifier::heuristic_only(),
            Box::new(FixedAssessor(verdict)),
        )
    }

    #[test]
    fn test_cold_start_end_to_end() {
        let pipeline = DecisionPipeline::new(
            RiskClassifier::heuristic_only(),
            Box::new(ColdStartAssessor::new()),
        );

        // Empty record: heuristic base risk 0.3, accepted.
        let decision = pipeline.process(&ApplicationRecord::empty("cold_case"));

        assert_eq!(decision.case_id, "cold_case");
        assert_eq!(decision.mode, FusionMode::ColdStart);
        assert_eq!(decision.reason, ReasonCode::ColdStartMlDecision);
        assert_eq!(decision.final_decision, Decision::Accept);
        assert_eq!(decision.confidence, 0.7);
        assert!(decision.human_validation_required);
    }

    #[test]
    fn test_fraud_stop_end_to_end() {
        let pipeline = pipeline_with(QualitativeVerdict {
            decision: Decision::Reject,
            confidence: Some(0.95),
            mode: PipelineMode::FraudStop,
            conditions: Vec::new(),
            top_similarity: Some(0.99),
        });

        let decision = pipeline.process(&ApplicationRecord::empty("fraud_case"));

        assert_eq!(decision.final_decision, Decision::Reject);
        assert_eq!(decision.mode, FusionMode::FraudStop);
        assert_eq!(decision.confidence, 0.95);
    }

    #[test]
    fn test_disagreement_end_to_end() {
        // Heuristic accepts the empty record; qualitative side rejects.
        let pipeline = pipeline_with(QualitativeVerdict {
            decision: Decision::Reject,
            confidence: Some(0.7),
            mode: PipelineMode::Normal,
            conditions: Vec::new(),
            top_similarity: Some(0.85),
        });

        let decision = pipeline.process(&ApplicationRecord::empty("conflict_case"));

        assert_eq!(decision.mode, FusionMode::ManualReviewRequired);
        assert_eq!(decision.final_decision, Decision::Accept);
        assert_eq!(decision.confidence, 0.5);
        assert!(decision.conflict_details.is_some());
    }

    #[test]
    fn test_audit_trail_carries_both_verdicts() {
        let qual = QualitativeVerdict {
            decision: Decision::Accept,
            confidence: Some(0.8),
            mode: PipelineMode::Normal,
            conditions: vec!["GUARANTOR_REQUIRED".to_string()],
            top_similarity: Some(0.9),
        };
        let pipeline = pipeline_with(qual.clone());

        let decision = pipeline.process(&ApplicationRecord::empty("audit_case"));

        assert_eq!(decision.qualitative_assessment, qual);
        assert_eq!(decision.ml_assessment.feature_count, 44);
        assert_eq!(decision.conditions, vec!["GUARANTOR_REQUIRED".to_string()]);
    }
}
