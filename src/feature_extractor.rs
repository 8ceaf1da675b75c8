//! Feature extraction for credit default risk inference.
//!
//! Turns a nested application record into a flat, fixed-schema numeric
//! vector. Extraction is pure and total: absent sections resolve to
//! documented defaults, so the key set and ordering are identical for every
//! record. The classifier and its tests depend on that contract.

use crate::types::application::{
    ApplicationRecord, BankingHistory, ClientStatus, CoherenceLevel, CreditPurpose, CreditType,
    GlobalRiskProfile, InteractionFrequency, JobStability, MainMotivation, MaritalStatus,
    ProfessionalStatus, ProjectionCapacity, RepaymentCapacity,
};
use serde::Serialize;

/// Number of features in the fixed schema
pub const FEATURE_COUNT: usize = 44;

/// Feature names in extraction order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "banking_seniority_years",
    "client_status_is_new",
    "interaction_frequency_rare",
    "dependents_count",
    "has_spouse",
    "spouse_income",
    "is_married",
    "is_employed_cdi",
    "is_unemployed",
    "job_seniority_years",
    "job_stability_high",
    "job_stability_low",
    "monthly_income",
    "monthly_expenses",
    "existing_debt",
    "debt_monthly_payment",
    "debt_ratio",
    "available_savings",
    "has_banking_incidents",
    "major_banking_incidents",
    "amount_requested",
    "duration_months",
    "is_real_estate",
    "is_investment",
    "is_comfort_expense",
    "stress_level",
    "urgency_level",
    "project_clarity",
    "engagement_level",
    "low_coherence",
    "external_pressure",
    "short_term_only",
    "risk_professional_instability",
    "risk_high_debt",
    "risk_spouse_dependency",
    "risk_non_priority",
    "risk_excessive_urgency",
    "risk_incoherent",
    "global_risk_high",
    "repayment_capacity_insufficient",
    "expense_ratio",
    "credit_to_income_ratio",
    "total_risk_flags",
];

// Indices used by the heuristic scorer and the derived-field computations.
const IDX_IS_UNEMPLOYED: usize = 9;
const IDX_JOB_STABILITY_LOW: usize = 12;
const IDX_MONTHLY_INCOME: usize = 13;
const IDX_MONTHLY_EXPENSES: usize = 14;
const IDX_DEBT_RATIO: usize = 17;
const IDX_MAJOR_BANKING_INCIDENTS: usize = 20;
const IDX_AMOUNT_REQUESTED: usize = 21;
const IDX_RISK_FLAGS_FIRST: usize = 33;
const IDX_RISK_FLAGS_LAST: usize = 38;
const IDX_TOTAL_RISK_FLAGS: usize = 43;

/// Fixed-schema numeric encoding of an application
///
/// Values are ordered exactly as [`FEATURE_NAMES`]; booleans are 0/1.
/// Only [`FeatureExtractor::extract`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// All values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.values[i])
    }

    /// Schema size (always [`FEATURE_COUNT`])
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values as f32, the shape model inference consumes
    pub fn as_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    pub fn monthly_income(&self) -> f64 {
        self.values[IDX_MONTHLY_INCOME]
    }

    pub fn debt_ratio(&self) -> f64 {
        self.values[IDX_DEBT_RATIO]
    }

    pub fn is_unemployed(&self) -> bool {
        self.values[IDX_IS_UNEMPLOYED] == 1.0
    }

    pub fn major_banking_incidents(&self) -> bool {
        self.values[IDX_MAJOR_BANKING_INCIDENTS] == 1.0
    }

    pub fn job_stability_low(&self) -> bool {
        self.values[IDX_JOB_STABILITY_LOW] == 1.0
    }

    pub fn total_risk_flags(&self) -> f64 {
        self.values[IDX_TOTAL_RISK_FLAGS]
    }
}

/// Extracts the fixed feature schema from an application record.
///
/// Matches the preprocessing used when the credit risk model was trained:
/// same names, same order, same defaults.
pub struct FeatureExtractor;

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from an application record.
    ///
    /// Never fails: every lookup into an optional section has an explicit
    /// default, and the derived ratios use sentinel values instead of
    /// dividing by a non-positive income.
    pub fn extract(&self, record: &ApplicationRecord) -> FeatureVector {
        let client = record.client_identity.as_ref();
        let personal = record.personal_situation.as_ref();
        let professional = record.professional_situation.as_ref();
        let financial = record.financial_situation.as_ref();
        let credit = record.credit_request.as_ref();
        let behavioral = record.behavioral_indicators.as_ref();
        let intention = record.real_intention.as_ref();
        let risks = record.risk_checklist.as_ref();
        let synthesis = record.synthesis.as_ref();

        let mut values = Vec::with_capacity(FEATURE_COUNT);

        // Client identity
        values.push(client.map(|c| c.age).unwrap_or(0.0));
        values.push(client.and_then(|c| c.banking_seniority_years).unwrap_or(0.0));
        values.push(flag(
            client.and_then(|c| c.client_status) == Some(ClientStatus::New),
        ));
        values.push(flag(
            client.and_then(|c| c.interaction_frequency) == Some(InteractionFrequency::Rare),
        ));

        // Personal situation
        values.push(personal.map(|p| p.dependents_count as f64).unwrap_or(0.0));
        let has_spouse = personal.map(|p| p.spouse_exists).unwrap_or(false);
        values.push(flag(has_spouse));
        // Spousal income is only read when the spouse-exists flag is set, so
        // stale spouse data cannot leak into the vector.
        let spouse_income = if has_spouse {
            personal
                .and_then(|p| p.spouse_info.as_ref())
                .and_then(|s| s.monthly_income)
                .unwrap_or(0.0)
        } else {
            0.0
        };
        values.push(spouse_income);
        values.push(flag(
            personal.and_then(|p| p.marital_status) == Some(MaritalStatus::Married),
        ));

        // Professional situation
        let status = professional.and_then(|p| p.professional_status);
        values.push(flag(status == Some(ProfessionalStatus::EmployeeCdi)));
        values.push(flag(status == Some(ProfessionalStatus::Unemployed)));
        values.push(professional.and_then(|p| p.seniority_years).unwrap_or(0.0));
        let stability = professional.and_then(|p| p.stability);
        values.push(flag(stability == Some(JobStability::High)));
        values.push(flag(stability == Some(JobStability::Low)));

        // Financial situation
        values.push(financial.map(|f| f.monthly_income_net).unwrap_or(0.0));
        values.push(financial.map(|f| f.monthly_fixed_expenses).unwrap_or(0.0));
        values.push(financial.and_then(|f| f.existing_credits_total).unwrap_or(0.0));
        values.push(
            financial
                .and_then(|f| f.existing_credits_monthly_payment)
                .unwrap_or(0.0),
        );
        values.push(financial.and_then(|f| f.debt_ratio).unwrap_or(0.0));
        values.push(financial.and_then(|f| f.available_savings).unwrap_or(0.0));
        let history = financial.and_then(|f| f.banking_history);
        values.push(flag(
            history == Some(BankingHistory::MinorIncidents)
                || history == Some(BankingHistory::MajorIncidents),
        ));
        values.push(flag(history == Some(BankingHistory::MajorIncidents)));

        // Credit request
        values.push(credit.map(|c| c.amount_requested).unwrap_or(0.0));
        values.push(credit.map(|c| c.duration_months as f64).unwrap_or(0.0));
        values.push(flag(
            credit.and_then(|c| c.credit_type) == Some(CreditType::RealEstate),
        ));
        let purpose = credit.and_then(|c| c.purpose);
        values.push(flag(purpose == Some(CreditPurpose::Investment)));
        values.push(flag(purpose == Some(CreditPurpose::ComfortExpense)));

        // Behavioral indicators (1-5 scales, 3 = neutral)
        values.push(behavioral.map(|b| b.stress_level as f64).unwrap_or(3.0));
        values.push(behavioral.map(|b| b.urgency_level as f64).unwrap_or(3.0));
        values.push(behavioral.map(|b| b.project_clarity as f64).unwrap_or(3.0));
        values.push(behavioral.map(|b| b.engagement_level as f64).unwrap_or(3.0));
        values.push(flag(
            behavioral.and_then(|b| b.discourse_coherence) == Some(CoherenceLevel::Low),
        ));

        // Stated intention
        values.push(flag(
            intention.and_then(|i| i.main_motivation) == Some(MainMotivation::ExternalPressure),
        ));
        values.push(flag(
            intention.and_then(|i| i.projection_capacity)
                == Some(ProjectionCapacity::ShortTermOnly),
        ));

        // Risk checklist
        values.push(flag(risks.map(|r| r.professional_instability).unwrap_or(false)));
        values.push(flag(risks.map(|r| r.high_debt).unwrap_or(false)));
        values.push(flag(risks.map(|r| r.spouse_income_dependency).unwrap_or(false)));
        values.push(flag(risks.map(|r| r.non_priority_project).unwrap_or(false)));
        values.push(flag(risks.map(|r| r.excessive_urgency).unwrap_or(false)));
        values.push(flag(risks.map(|r| r.incoherent_discourse).unwrap_or(false)));

        // Synthesis
        values.push(flag(
            synthesis.and_then(|s| s.global_risk_profile) == Some(GlobalRiskProfile::High),
        ));
        values.push(flag(
            synthesis.and_then(|s| s.theoretical_repayment_capacity)
                == Some(RepaymentCapacity::Insufficient),
        ));

        // Derived ratios, computed from already-extracted base fields only.
        // Non-positive income takes fixed "maximally risky" sentinels rather
        // than propagating a division error.
        let monthly_income = values[IDX_MONTHLY_INCOME];
        if monthly_income > 0.0 {
            values.push(values[IDX_MONTHLY_EXPENSES] / monthly_income);
            values.push(values[IDX_AMOUNT_REQUESTED] / (monthly_income * 12.0));
        } else {
            values.push(1.0);
            values.push(10.0);
        }

        // Count of the six checklist flags
        let total_risk_flags: f64 = values[IDX_RISK_FLAGS_FIRST..=IDX_RISK_FLAGS_LAST]
            .iter()
            .sum();
        values.push(total_risk_flags);

        debug_assert_eq!(values.len(), FEATURE_COUNT);

        FeatureVector { values }
    }

    /// Number of features produced
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Feature names in extraction order
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::application::*;

    fn full_record() -> ApplicationRecord {
        ApplicationRecord {
            case_id: Some("case_full".to_string()),
            submitted_at: None,
            client_identity: Some(ClientIdentity {
                client_id: None,
                full_name: None,
                age: 35.0,
                client_status: Some(ClientStatus::New),
                banking_seniority_years: Some(5.0),
                interaction_frequency: Some(InteractionFrequency::Rare),
            }),
            personal_situation: Some(PersonalSituation {
                marital_status: Some(MaritalStatus::Married),
                dependents_count: 2,
                spouse_exists: true,
                spouse_info: Some(SpouseInfo {
                    professional_status: Some(SpouseProfessionalStatus::Employed),
                    monthly_income: Some(2500.0),
                }),
            }),
            professional_situation: Some(ProfessionalSituation {
                professional_status: Some(ProfessionalStatus::EmployeeCdi),
                sector: Some("TECHNOLOGY".to_string()),
                seniority_years: Some(8.0),
                stability: Some(JobStability::High),
            }),
            financial_situation: Some(FinancialSituation {
                monthly_income_net: 3500.0,
                monthly_fixed_expenses: 1800.0,
                existing_credits_total: Some(10000.0),
                existing_credits_monthly_payment: Some(300.0),
                debt_ratio: Some(0.086),
                available_savings: Some(15000.0),
                banking_history: Some(BankingHistory::NoIncident),
            }),
            credit_request: Some(CreditRequest {
                credit_type: Some(CreditType::Personal),
                amount_requested: 21000.0,
                duration_months: 48,
                estimated_monthly_payment: None,
                purpose: Some(CreditPurpose::NecessaryExpense),
            }),
            behavioral_indicators: Some(BehavioralIndicators {
                stress_level: 2,
                urgency_level: 3,
                project_clarity: 4,
                engagement_level: 5,
                discourse_coherence: Some(CoherenceLevel::High),
            }),
            real_intention: Some(RealIntention {
                main_motivation: Some(MainMotivation::Necessity),
                projection_capacity: Some(ProjectionCapacity::LongTerm),
            }),
            risk_checklist: Some(RiskChecklist {
                high_debt: true,
                excessive_urgency: true,
                ..RiskChecklist::default()
            }),
            synthesis: Some(Synthesis {
                global_risk_profile: Some(GlobalRiskProfile::Low),
                theoretical_repayment_capacity: Some(RepaymentCapacity::Solid),
            }),
        }
    }

    #[test]
    fn test_full_record_extraction() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&full_record());

        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features.get("age"), Some(35.0));
        assert_eq!(features.get("client_status_is_new"), Some(1.0));
        assert_eq!(features.get("has_spouse"), Some(1.0));
        assert_eq!(features.get("spouse_income"), Some(2500.0));
        assert_eq!(features.get("is_employed_cdi"), Some(1.0));
        assert_eq!(features.get("is_unemployed"), Some(0.0));
        assert_eq!(features.get("has_banking_incidents"), Some(0.0));
        assert_eq!(features.get("expense_ratio"), Some(1800.0 / 3500.0));
        assert_eq!(
            features.get("credit_to_income_ratio"),
            Some(21000.0 / (3500.0 * 12.0))
        );
        assert_eq!(features.get("total_risk_flags"), Some(2.0));
    }

    #[test]
    fn test_schema_is_exhaustive_for_empty_record() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&ApplicationRecord::empty("case_empty"));

        assert_eq!(features.len(), FEATURE_COUNT);
        // Missing sections resolve to documented defaults, not errors.
        assert_eq!(features.get("age"), Some(0.0));
        assert_eq!(features.get("dependents_count"), Some(0.0));
        assert_eq!(features.get("stress_level"), Some(3.0));
        assert_eq!(features.get("engagement_level"), Some(3.0));
        assert_eq!(features.get("has_banking_incidents"), Some(0.0));
        assert_eq!(features.get("total_risk_flags"), Some(0.0));
        // Income <= 0 takes the ratio sentinels.
        assert_eq!(features.get("expense_ratio"), Some(1.0));
        assert_eq!(features.get("credit_to_income_ratio"), Some(10.0));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = FeatureExtractor::new();
        let record = full_record();

        let a = extractor.extract(&record);
        let b = extractor.extract(&record);

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_spouse_income_gated_on_flag() {
        let mut record = full_record();
        // Flag toggled off while spouse data is still present.
        record.personal_situation.as_mut().unwrap().spouse_exists = false;

        let features = FeatureExtractor::new().extract(&record);
        assert_eq!(features.get("has_spouse"), Some(0.0));
        assert_eq!(features.get("spouse_income"), Some(0.0));
    }

    #[test]
    fn test_ratio_sentinels_on_zero_income() {
        let mut record = full_record();
        record
            .financial_situation
            .as_mut()
            .unwrap()
            .monthly_income_net = 0.0;

        let features = FeatureExtractor::new().extract(&record);
        assert_eq!(features.get("expense_ratio"), Some(1.0));
        assert_eq!(features.get("credit_to_income_ratio"), Some(10.0));
        // Other fields are unaffected.
        assert_eq!(features.get("amount_requested"), Some(21000.0));
    }

    #[test]
    fn test_total_risk_flags_counts_all_six() {
        let mut record = full_record();
        record.risk_checklist = Some(RiskChecklist {
            professional_instability: true,
            high_debt: true,
            spouse_income_dependency: true,
            non_priority_project: true,
            excessive_urgency: true,
            incoherent_discourse: true,
        });

        let features = FeatureExtractor::new().extract(&record);
        assert_eq!(features.get("total_risk_flags"), Some(6.0));
    }

    #[test]
    fn test_feature_names_match_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), FEATURE_COUNT);
        assert_eq!(extractor.feature_names().len(), FEATURE_COUNT);
    }
}
