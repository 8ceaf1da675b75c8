//! Decision fusion for the two assessment pipelines
//!
//! Reconciles the structured-feature classifier verdict with the qualitative
//! pipeline verdict into one final decision. The logic is a small state
//! machine keyed on the qualitative operating mode:
//!
//! - FRAUD_STOP and COLD_START are override modes: they represent the
//!   absence of a normal comparison (certain fraud signal, or no historical
//!   basis for the qualitative side), so they never enter the weighted
//!   agreement path.
//! - In NORMAL mode, agreement averages the two complementary confidence
//!   signals symmetrically; disagreement collapses confidence to the 0.5
//!   midpoint and routes to a human with full conflict detail, since any
//!   blended number would imply calibration that does not exist.
//!
//! Confidences are rounded to two decimals and the artifact carries no
//! generated identifiers, so fusing identical inputs is byte-for-byte
//! reproducible. The decision id and timestamp are stamped onto the wire
//! envelope at publication, not here.

use crate::types::decision::{
    ConflictDetail, FollowUpAction, FusedDecision, FusionMode, ReasonCode,
};
use crate::types::verdict::{Decision, PipelineMode, QualitativeVerdict, RiskVerdict};
use tracing::{debug, info};

/// Default qualitative confidence in FRAUD_STOP when none is reported
const FRAUD_STOP_DEFAULT_CONFIDENCE: f64 = 0.9;
/// Default qualitative confidence in NORMAL mode when none is reported
const NORMAL_DEFAULT_CONFIDENCE: f64 = 0.5;
/// Fixed confidence for unresolved pipeline disagreement
const DISAGREEMENT_CONFIDENCE: f64 = 0.5;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Combines the two pipeline verdicts into one final decision
pub struct DecisionFusionEngine;

impl DecisionFusionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fuse the classifier verdict with the qualitative verdict.
    ///
    /// Total function: every mode/agreement combination produces a decision,
    /// and disagreement is a first-class outcome rather than an error.
    pub fn fuse(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        let decision = match qualitative.mode {
            PipelineMode::FraudStop => self.fraud_stop(case_id, ml, qualitative),
            PipelineMode::ColdStart => self.cold_start(case_id, ml, qualitative),
            PipelineMode::Normal => match (ml.decision, qualitative.decision) {
                (Decision::Accept, Decision::Accept) => {
                    self.agree_accept(case_id, ml, qualitative)
                }
                (Decision::Reject, Decision::Reject) => {
                    self.agree_reject(case_id, ml, qualitative)
                }
                (Decision::Accept, Decision::Reject) | (Decision::Reject, Decision::Accept) => {
                    self.disagreement(case_id, ml, qualitative)
                }
            },
        };

        debug!(
            case_id = %case_id,
            final_decision = ?decision.final_decision,
            reason = ?decision.reason,
            confidence = decision.confidence,
            "Fusion complete"
        );

        decision
    }

    /// Certain fraud signal: reject regardless of the classifier verdict.
    fn fraud_stop(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        let confidence = qualitative
            .confidence
            .unwrap_or(FRAUD_STOP_DEFAULT_CONFIDENCE);

        info!(case_id = %case_id, "Fraud stop: rejecting and routing to investigation");

        self.build(case_id, ml, qualitative)
            .decision(Decision::Reject)
            .reason(ReasonCode::FraudDetected)
            .confidence(confidence)
            .mode(FusionMode::FraudStop)
            .action(FollowUpAction::SendToInvestigation)
            .finish()
    }

    /// No comparable case history: defer entirely to the classifier.
    fn cold_start(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        self.build(case_id, ml, qualitative)
            .decision(ml.decision)
            .reason(ReasonCode::ColdStartMlDecision)
            .confidence(1.0 - ml.probability)
            .mode(FusionMode::ColdStart)
            .human_validation()
            .finish()
    }

    /// Both pipelines independently conclude low risk.
    fn agree_accept(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        let qualitative_confidence = qualitative.confidence.unwrap_or(NORMAL_DEFAULT_CONFIDENCE);
        let confidence = 0.5 * (1.0 - ml.probability) + 0.5 * qualitative_confidence;

        self.build(case_id, ml, qualitative)
            .decision(Decision::Accept)
            .reason(ReasonCode::BothPipelinesAgreeAccept)
            .confidence(confidence)
            .mode(FusionMode::Normal)
            .conditions(qualitative.conditions.clone())
            .finish()
    }

    /// Both pipelines independently conclude high risk.
    fn agree_reject(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        let qualitative_confidence = qualitative.confidence.unwrap_or(NORMAL_DEFAULT_CONFIDENCE);
        let confidence = 0.5 * ml.probability + 0.5 * (1.0 - qualitative_confidence);

        self.build(case_id, ml, qualitative)
            .decision(Decision::Reject)
            .reason(ReasonCode::BothPipelinesAgreeReject)
            .confidence(confidence)
            .mode(FusionMode::Normal)
            .finish()
    }

    /// No consensus: ML tie-break, marked low-confidence, routed to a human.
    fn disagreement(
        &self,
        case_id: &str,
        ml: &RiskVerdict,
        qualitative: &QualitativeVerdict,
    ) -> FusedDecision {
        let conflict = ConflictDetail {
            ml_decision: ml.decision,
            qualitative_decision: qualitative.decision,
            ml_confidence: round2(1.0 - ml.probability),
            qualitative_confidence: qualitative.confidence.unwrap_or(0.0),
        };

        info!(
            case_id = %case_id,
            ml_decision = ?ml.decision,
            qualitative_decision = ?qualitative.decision,
            "Pipelines disagree, flagging for manual review"
        );

        self.build(case_id, ml, qualitative)
            .decision(ml.decision)
            .reason(ReasonCode::PipelinesDisagree)
            .confidence(DISAGREEMENT_CONFIDENCE)
            .mode(FusionMode::ManualReviewRequired)
            .human_validation()
            .conflict(conflict)
            .finish()
    }

    fn build<'a>(
        &self,
        case_id: &str,
        ml: &'a RiskVerdict,
        qualitative: &'a QualitativeVerdict,
    ) -> FusedDecisionBuilder<'a> {
        FusedDecisionBuilder::new(case_id, ml, qualitative)
    }
}

impl Default for DecisionFusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles the terminal decision artifact; both source verdicts are
/// embedded verbatim for audit replay.
struct FusedDecisionBuilder<'a> {
    case_id: String,
    ml: &'a RiskVerdict,
    qualitative: &'a QualitativeVerdict,
    final_decision: Decision,
    reason: ReasonCode,
    confidence: f64,
    mode: FusionMode,
    conditions: Vec<String>,
    human_validation_required: bool,
    conflict_details: Option<ConflictDetail>,
    action: Option<FollowUpAction>,
}

impl<'a> FusedDecisionBuilder<'a> {
    fn new(case_id: &str, ml: &'a RiskVerdict, qualitative: &'a QualitativeVerdict) -> Self {
        Self {
            case_id: case_id.to_string(),
            ml,
            qualitative,
            final_decision: Decision::Reject,
            reason: ReasonCode::PipelinesDisagree,
            confidence: 0.0,
            mode: FusionMode::Normal,
            conditions: Vec::new(),
            human_validation_required: false,
            conflict_details: None,
            action: None,
        }
    }

    fn decision(mut self, decision: Decision) -> Self {
        self.final_decision = decision;
        self
    }

    fn reason(mut self, reason: ReasonCode) -> Self {
        self.reason = reason;
        self
    }

    fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    fn mode(mut self, mode: FusionMode) -> Self {
        self.mode = mode;
        self
    }

    fn conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    fn human_validation(mut self) -> Self {
        self.human_validation_required = true;
        self
    }

    fn conflict(mut self, detail: ConflictDetail) -> Self {
        self.conflict_details = Some(detail);
        self
    }

    fn action(mut self, action: FollowUpAction) -> Self {
        self.action = Some(action);
        self
    }

    fn finish(self) -> FusedDecision {
        FusedDecision {
            case_id: self.case_id,
            final_decision: self.final_decision,
            reason: self.reason,
            confidence: round2(self.confidence),
            mode: self.mode,
            conditions: self.conditions,
            ml_assessment: self.ml.clone(),
            qualitative_assessment: self.qualitative.clone(),
            human_validation_required: self.human_validation_required,
            conflict_details: self.conflict_details,
            action: self.action,
        }
    }
}
