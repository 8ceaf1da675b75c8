//! Test Application Producer
//!
//! Generates and publishes synthetic credit applications to NATS for
//! pipeline testing.

use chrono::Utc;
use credit_decision_pipeline::types::application::*;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Synthetic application generator
struct ApplicationGenerator {
    rng: rand::rngs::ThreadRng,
    case_counter: u64,
}

impl ApplicationGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            case_counter: 0,
        }
    }

    /// Generate a solid applicant profile
    fn generate_low_risk(&mut self) -> ApplicationRecord {
        self.case_counter += 1;
        let monthly_income = self.rng.gen_range(2500.0..5500.0);
        let monthly_expenses = monthly_income * self.rng.gen_range(0.35..0.55);

        ApplicationRecord {
            case_id: Some(format!("case_{:08}", self.case_counter)),
            submitted_at: Some(Utc::now()),
            client_identity: Some(ClientIdentity {
                client_id: Some(format!("client_{}", self.rng.gen_range(1..10000))),
                full_name: None,
                age: self.rng.gen_range(28.0..60.0),
                client_status: Some(ClientStatus::Regular),
                banking_seniority_years: Some(self.rng.gen_range(3.0..20.0)),
                interaction_frequency: Some(InteractionFrequency::Frequent),
            }),
            personal_situation: Some(PersonalSituation {
                marital_status: Some(MaritalStatus::Married),
                dependents_count: self.rng.gen_range(0..3),
                spouse_exists: true,
                spouse_info: Some(SpouseInfo {
                    professional_status: Some(SpouseProfessionalStatus::Employed),
                    monthly_income: Some(self.rng.gen_range(1500.0..3500.0)),
                }),
            }),
            professional_situation: Some(ProfessionalSituation {
                professional_status: Some(ProfessionalStatus::EmployeeCdi),
                sector: Some("TECHNOLOGY".to_string()),
                seniority_years: Some(self.rng.gen_range(5.0..15.0)),
                stability: Some(JobStability::High),
            }),
            financial_situation: Some(FinancialSituation {
                monthly_income_net: monthly_income,
                monthly_fixed_expenses: monthly_expenses,
                existing_credits_total: Some(self.rng.gen_range(0.0..15000.0)),
                existing_credits_monthly_payment: Some(self.rng.gen_range(0.0..300.0)),
                debt_ratio: Some(self.rng.gen_range(0.0..0.25)),
                available_savings: Some(self.rng.gen_range(5000.0..50000.0)),
                banking_history: Some(BankingHistory::NoIncident),
            }),
            credit_request: Some(CreditRequest {
                credit_type: Some(CreditType::Personal),
                amount_requested: self.rng.gen_range(5000.0..30000.0),
                duration_months: *self.random_choice(&[24, 36, 48, 60]),
                estimated_monthly_payment: None,
                purpose: Some(CreditPurpose::NecessaryExpense),
            }),
            behavioral_indicators: Some(BehavioralIndicators {
                stress_level: self.rng.gen_range(1..3),
                urgency_level: self.rng.gen_range(1..4),
                project_clarity: self.rng.gen_range(4..6),
                engagement_level: self.rng.gen_range(4..6),
                discourse_coherence: Some(CoherenceLevel::High),
            }),
            real_intention: Some(RealIntention {
                main_motivation: Some(MainMotivation::Necessity),
                projection_capacity: Some(ProjectionCapacity::LongTerm),
            }),
            risk_checklist: Some(RiskChecklist::default()),
            synthesis: Some(Synthesis {
                global_risk_profile: Some(GlobalRiskProfile::Low),
                theoretical_repayment_capacity: Some(RepaymentCapacity::Solid),
            }),
        }
    }

    /// Generate a fragile applicant profile
    fn generate_high_risk(&mut self) -> ApplicationRecord {
        self.case_counter += 1;
        let monthly_income = self.rng.gen_range(600.0..1200.0);

        ApplicationRecord {
            case_id: Some(format!("case_{:08}", self.case_counter)),
            submitted_at: Some(Utc::now()),
            client_identity: Some(ClientIdentity {
                client_id: Some(format!("client_{}", self.rng.gen_range(1..10000))),
                full_name: None,
                age: self.rng.gen_range(20.0..65.0),
                client_status: Some(ClientStatus::New),
                banking_seniority_years: Some(self.rng.gen_range(0.0..1.0)),
                interaction_frequency: Some(InteractionFrequency::Rare),
            }),
            personal_situation: Some(PersonalSituation {
                marital_status: Some(MaritalStatus::Single),
                dependents_count: self.rng.gen_range(0..5),
                spouse_exists: false,
                spouse_info: None,
            }),
            professional_situation: Some(ProfessionalSituation {
                professional_status: Some(ProfessionalStatus::Unemployed),
                sector: None,
                seniority_years: Some(0.0),
                stability: Some(JobStability::Low),
            }),
            financial_situation: Some(FinancialSituation {
                monthly_income_net: monthly_income,
                monthly_fixed_expenses: monthly_income * self.rng.gen_range(0.7..1.1),
                existing_credits_total: Some(self.rng.gen_range(5000.0..50000.0)),
                existing_credits_monthly_payment: Some(self.rng.gen_range(300.0..900.0)),
                debt_ratio: Some(self.rng.gen_range(0.5..0.9)),
                available_savings: Some(0.0),
                banking_history: Some(BankingHistory::MajorIncidents),
            }),
            credit_request: Some(CreditRequest {
                credit_type: Some(CreditType::Personal),
                amount_requested: self.rng.gen_range(10000.0..60000.0),
                duration_months: *self.random_choice(&[12, 24, 84]),
                estimated_monthly_payment: None,
                purpose: Some(CreditPurpose::ComfortExpense),
            }),
            behavioral_indicators: Some(BehavioralIndicators {
                stress_level: self.rng.gen_range(4..6),
                urgency_level: self.rng.gen_range(4..6),
                project_clarity: self.rng.gen_range(1..3),
                engagement_level: self.rng.gen_range(1..3),
                discourse_coherence: Some(CoherenceLevel::Low),
            }),
            real_intention: Some(RealIntention {
                main_motivation: Some(MainMotivation::ExternalPressure),
                projection_capacity: Some(ProjectionCapacity::ShortTermOnly),
            }),
            risk_checklist: Some(RiskChecklist {
                professional_instability: true,
                high_debt: true,
                spouse_income_dependency: false,
                non_priority_project: true,
                excessive_urgency: true,
                incoherent_discourse: self.rng.gen_bool(0.5),
            }),
            synthesis: Some(Synthesis {
                global_risk_profile: Some(GlobalRiskProfile::High),
                theoretical_repayment_capacity: Some(RepaymentCapacity::Insufficient),
            }),
        }
    }

    fn random_choice<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        &choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Application Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("credit.applications");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let high_risk_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        high_risk_rate = high_risk_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, high_risk_rate, delay_ms).await;
        }
    };

    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} applications...", count);

    let mut low_risk_count = 0;
    let mut high_risk_count = 0;

    for i in 0..count {
        let record = if rng.gen_bool(high_risk_rate) {
            high_risk_count += 1;
            generator.generate_high_risk()
        } else {
            low_risk_count += 1;
            generator.generate_low_risk()
        };

        let payload = serde_json::to_vec(&record)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} applications ({} low-risk, {} high-risk)",
                i + 1,
                count,
                low_risk_count,
                high_risk_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} applications ({} low-risk, {} high-risk)",
        count, low_risk_count, high_risk_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, high_risk_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let record = if rng.gen_bool(high_risk_rate) {
            generator.generate_high_risk()
        } else {
            generator.generate_low_risk()
        };

        let json = serde_json::to_string_pretty(&record)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample application {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
