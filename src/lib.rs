//! Credit Decision Pipeline Library
//!
//! Assesses credit-application risk through two independent pipelines, a
//! structured-feature classifier and a retrieval-augmented qualitative
//! assessment, and fuses their verdicts into one bounded, explainable
//! decision with an audit trail.

pub mod classifier;
pub mod config;
pub mod consumer;
pub mod feature_extractor;
pub mod fusion;
pub mod metrics;
pub mod pipeline;
pub mod producer;
pub mod qualitative;
pub mod types;

pub use classifier::RiskClassifier;
pub use config::AppConfig;
pub use consumer::ApplicationConsumer;
pub use feature_extractor::{FeatureExtractor, FeatureVector};
pub use fusion::DecisionFusionEngine;
pub use pipeline::DecisionPipeline;
pub use producer::DecisionProducer;
pub use qualitative::{ClientProfile, ColdStartAssessor, QualitativeAssessor};
pub use types::{ApplicationRecord, FusedDecision, QualitativeVerdict, RiskVerdict};
