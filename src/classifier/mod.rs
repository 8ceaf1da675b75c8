//! Risk classification components

pub mod heuristic;
pub mod loader;
pub mod scorer;

pub use heuristic::HeuristicScorer;
pub use loader::{LoadedModel, ModelLoader};
pub use scorer::RiskClassifier;
