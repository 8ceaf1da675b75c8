//! Credit application data structures
//!
//! The application record is a nested, partially-optional form covering nine
//! sections. Field and section names are a fixed wire contract; schema
//! validation of the raw record happens upstream, so every section is
//! optional here and the feature extractor resolves absences via defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relationship history between the client and the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Regular,
    Occasional,
    New,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionFrequency {
    Rare,
    Medium,
    Frequent,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub client_id: Option<String>,
    /// Masked for privacy
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: f64,
    pub client_status: Option<ClientStatus>,
    pub banking_seniority_years: Option<f64>,
    pub interaction_frequency: Option<InteractionFrequency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpouseProfessionalStatus {
    Employed,
    SelfEmployed,
    Unemployed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpouseInfo {
    pub professional_status: Option<SpouseProfessionalStatus>,
    pub monthly_income: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalSituation {
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub dependents_count: u32,
    #[serde(default)]
    pub spouse_exists: bool,
    pub spouse_info: Option<SpouseInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfessionalStatus {
    EmployeeCdi,
    EmployeeCdd,
    SelfEmployed,
    Entrepreneur,
    Unemployed,
    #[serde(other)]
    Unknown,
}

/// Three-level stability assessment, also mapped to a numeric score for the
/// qualitative collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStability {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalSituation {
    pub professional_status: Option<ProfessionalStatus>,
    pub sector: Option<String>,
    pub seniority_years: Option<f64>,
    pub stability: Option<JobStability>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankingHistory {
    NoIncident,
    MinorIncidents,
    MajorIncidents,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSituation {
    #[serde(default)]
    pub monthly_income_net: f64,
    #[serde(default)]
    pub monthly_fixed_expenses: f64,
    pub existing_credits_total: Option<f64>,
    pub existing_credits_monthly_payment: Option<f64>,
    pub debt_ratio: Option<f64>,
    pub available_savings: Option<f64>,
    pub banking_history: Option<BankingHistory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
    RealEstate,
    Personal,
    Auto,
    Professional,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditPurpose {
    Investment,
    NecessaryExpense,
    ComfortExpense,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRequest {
    pub credit_type: Option<CreditType>,
    #[serde(default)]
    pub amount_requested: f64,
    #[serde(default)]
    pub duration_months: u32,
    pub estimated_monthly_payment: Option<f64>,
    pub purpose: Option<CreditPurpose>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoherenceLevel {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

/// Interview-derived behavioral signals on 1-5 scales, 3 = neutral
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralIndicators {
    #[serde(default = "neutral_level")]
    pub stress_level: u8,
    #[serde(default = "neutral_level")]
    pub urgency_level: u8,
    #[serde(default = "neutral_level")]
    pub project_clarity: u8,
    #[serde(default = "neutral_level")]
    pub engagement_level: u8,
    pub discourse_coherence: Option<CoherenceLevel>,
}

fn neutral_level() -> u8 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MainMotivation {
    Necessity,
    Opportunity,
    ExternalPressure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionCapacity {
    ShortTermOnly,
    MediumTerm,
    LongTerm,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealIntention {
    pub main_motivation: Option<MainMotivation>,
    pub projection_capacity: Option<ProjectionCapacity>,
}

/// Advisor checklist of identified risk factors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskChecklist {
    #[serde(default)]
    pub professional_instability: bool,
    #[serde(default)]
    pub high_debt: bool,
    #[serde(default)]
    pub spouse_income_dependency: bool,
    #[serde(default)]
    pub non_priority_project: bool,
    #[serde(default)]
    pub excessive_urgency: bool,
    #[serde(default)]
    pub incoherent_discourse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRiskProfile {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepaymentCapacity {
    Insufficient,
    Acceptable,
    Solid,
    #[serde(other)]
    Unknown,
}

/// Advisor synthesis judgment over the whole application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub global_risk_profile: Option<GlobalRiskProfile>,
    pub theoretical_repayment_capacity: Option<RepaymentCapacity>,
}

/// A credit application to be assessed for default risk
///
/// Sections are optional: the feature extraction contract guarantees that a
/// record with arbitrary missing sections still produces the full feature
/// schema with documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub case_id: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub client_identity: Option<ClientIdentity>,
    #[serde(default)]
    pub personal_situation: Option<PersonalSituation>,
    #[serde(default)]
    pub professional_situation: Option<ProfessionalSituation>,
    #[serde(default)]
    pub financial_situation: Option<FinancialSituation>,
    #[serde(default)]
    pub credit_request: Option<CreditRequest>,
    #[serde(default)]
    pub behavioral_indicators: Option<BehavioralIndicators>,
    #[serde(default)]
    pub real_intention: Option<RealIntention>,
    #[serde(default)]
    pub risk_checklist: Option<RiskChecklist>,
    #[serde(default)]
    pub synthesis: Option<Synthesis>,
}

impl ApplicationRecord {
    /// Create a minimal record with only a case id, all sections absent
    pub fn empty(case_id: &str) -> Self {
        Self {
            case_id: Some(case_id.to_string()),
            submitted_at: None,
            client_identity: None,
            personal_situation: None,
            professional_situation: None,
            financial_situation: None,
            credit_request: None,
            behavioral_indicators: None,
            real_intention: None,
            risk_checklist: None,
            synthesis: None,
        }
    }

    pub fn case_id(&self) -> &str {
        self.case_id.as_deref().unwrap_or("UNKNOWN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let record = ApplicationRecord::empty("case_001");
        let json = serde_json::to_string(&record).unwrap();
        let back: ApplicationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.case_id(), "case_001");
        assert!(back.financial_situation.is_none());
    }

    #[test]
    fn test_missing_sections_deserialize() {
        let record: ApplicationRecord = serde_json::from_str(r#"{"case_id":"c1"}"#).unwrap();
        assert!(record.client_identity.is_none());
        assert!(record.risk_checklist.is_none());
    }

    #[test]
    fn test_unknown_enum_value_is_tolerated() {
        let json = r#"{
            "case_id": "c2",
            "professional_situation": {
                "professional_status": "FREELANCE_GIG",
                "stability": "HIGH"
            }
        }"#;
        let record: ApplicationRecord = serde_json::from_str(json).unwrap();
        let pro = record.professional_situation.unwrap();
        assert_eq!(pro.professional_status, Some(ProfessionalStatus::Unknown));
        assert_eq!(pro.stability, Some(JobStability::High));
    }

    #[test]
    fn test_behavioral_defaults() {
        let json = r#"{"discourse_coherence": "LOW"}"#;
        let behavioral: BehavioralIndicators = serde_json::from_str(json).unwrap();
        assert_eq!(behavioral.stress_level, 3);
        assert_eq!(behavioral.engagement_level, 3);
        assert_eq!(behavioral.discourse_coherence, Some(CoherenceLevel::Low));
    }
}
