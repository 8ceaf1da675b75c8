//! Type definitions for the credit decision pipeline

pub mod application;
pub mod decision;
pub mod verdict;

pub use application::ApplicationRecord;
pub use decision::{ConflictDetail, DecisionEnvelope, FusedDecision, FusionMode, ReasonCode};
pub use verdict::{Decision, PipelineMode, QualitativeVerdict, RiskBucket, RiskVerdict, VerdictSource};
