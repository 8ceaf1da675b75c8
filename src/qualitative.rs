//! Qualitative pipeline boundary
//!
//! The retrieval-augmented qualitative pipeline (embedding, retrieval,
//! fraud, traditional-risk and scenario agents) lives outside this crate.
//! It is invoked through [`QualitativeAssessor`] with a simplified client
//! profile derived from the application record, and answers with a
//! [`QualitativeVerdict`] that the fusion engine reconciles against the
//! classifier.

use crate::types::application::{ApplicationRecord, JobStability};
use crate::types::verdict::{Decision, PipelineMode, QualitativeVerdict};
use serde::Serialize;

/// Simplified client profile handed to the qualitative collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientProfile {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub debt_ratio: f64,
    /// Three-level stability enum mapped to a score
    pub stability_score: f64,
}

impl ClientProfile {
    /// Derive the profile from an application record.
    ///
    /// Stability maps LOW -> 0.3, MEDIUM -> 0.5, HIGH -> 0.8; absent or
    /// unknown stability takes the middle score.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        let financial = record.financial_situation.as_ref();
        let stability = record
            .professional_situation
            .as_ref()
            .and_then(|p| p.stability);

        let stability_score = match stability {
            Some(JobStability::Low) => 0.3,
            Some(JobStability::High) => 0.8,
            Some(JobStability::Medium) | Some(JobStability::Unknown) | None => 0.5,
        };

        Self {
            monthly_income: financial.map(|f| f.monthly_income_net).unwrap_or(0.0),
            monthly_expenses: financial.map(|f| f.monthly_fixed_expenses).unwrap_or(0.0),
            debt_ratio: financial.and_then(|f| f.debt_ratio).unwrap_or(0.0),
            stability_score,
        }
    }
}

/// Capability boundary of the qualitative pipeline
pub trait QualitativeAssessor: Send + Sync {
    fn assess(&self, profile: &ClientProfile, record: &ApplicationRecord) -> QualitativeVerdict;
}

/// Assessor used when no case-history backend is attached.
///
/// Always reports COLD_START: with no comparable historical cases the
/// qualitative side has nothing to lean on, and fusion defers to the
/// classifier with mandatory human validation. This is a supported
/// operating mode, not a failure.
pub struct ColdStartAssessor;

impl ColdStartAssessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ColdStartAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl QualitativeAssessor for ColdStartAssessor {
    fn assess(&self, _profile: &ClientProfile, _record: &ApplicationRecord) -> QualitativeVerdict {
        QualitativeVerdict {
            decision: Decision::Accept,
            confidence: None,
            mode: PipelineMode::ColdStart,
            conditions: Vec::new(),
            top_similarity: Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::application::{FinancialSituation, ProfessionalSituation};

    #[test]
    fn test_profile_from_full_record() {
        let mut record = ApplicationRecord::empty("profile_case");
        record.financial_situation = Some(FinancialSituation {
            monthly_income_net: 3200.0,
            monthly_fixed_expenses: 1400.0,
            existing_credits_total: None,
            existing_credits_monthly_payment: None,
            debt_ratio: Some(0.25),
            available_savings: None,
            banking_history: None,
        });
        record.professional_situation = Some(ProfessionalSituation {
            professional_status: None,
            sector: None,
            seniority_years: None,
            stability: Some(JobStability::High),
        });

        let profile = ClientProfile::from_record(&record);
        assert_eq!(profile.monthly_income, 3200.0);
        assert_eq!(profile.monthly_expenses, 1400.0);
        assert_eq!(profile.debt_ratio, 0.25);
        assert_eq!(profile.stability_score, 0.8);
    }

    #[test]
    fn test_stability_mapping() {
        let mut record = ApplicationRecord::empty("stability_case");
        for (stability, expected) in [
            (Some(JobStability::Low), 0.3),
            (Some(JobStability::Medium), 0.5),
            (Some(JobStability::High), 0.8),
            (None, 0.5),
        ] {
            record.professional_situation = Some(ProfessionalSituation {
                professional_status: None,
                sector: None,
                seniority_years: None,
                stability,
            });
            assert_eq!(ClientProfile::from_record(&record).stability_score, expected);
        }
    }

    #[test]
    fn test_profile_defaults_for_empty_record() {
        let profile = ClientProfile::from_record(&ApplicationRecord::empty("empty"));
        assert_eq!(profile.monthly_income, 0.0);
        assert_eq!(profile.debt_ratio, 0.0);
        assert_eq!(profile.stability_score, 0.5);
    }

    #[test]
    fn test_cold_start_assessor_reports_cold_start() {
        let record = ApplicationRecord::empty("cold");
        let profile = ClientProfile::from_record(&record);
        let verdict = ColdStartAssessor::new().assess(&profile, &record);

        assert_eq!(verdict.mode, PipelineMode::ColdStart);
        assert_eq!(verdict.top_similarity, Some(0.0));
        assert!(verdict.confidence.is_none());
    }
}
