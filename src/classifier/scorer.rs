//! Risk classification over the extracted feature vector
//!
//! Wraps the optional trained model; degrades to the heuristic scorer when
//! no model is loaded or an invocation faults. `score` never fails: every
//! fault is absorbed here and converted into a heuristic verdict.

use crate::classifier::heuristic::HeuristicScorer;
use crate::classifier::loader::{LoadedModel, ModelLoader};
use crate::config::ModelConfig;
use crate::feature_extractor::FeatureVector;
use crate::types::verdict::{Decision, RiskBucket, RiskVerdict, VerdictSource};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Model-path REJECT threshold
const MODEL_REJECT_THRESHOLD: f64 = 0.5;
/// Heuristic-path REJECT threshold, deliberately more conservative before
/// flagging than the model path
const HEURISTIC_REJECT_THRESHOLD: f64 = 0.6;

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// One scoring strategy per verdict source
enum ScoringStrategy {
    /// Trained model; the session needs mutable access to run
    Model(RwLock<LoadedModel>),
    /// No model loaded: deterministic heuristic only
    Heuristic,
}

/// Classifier producing one [`RiskVerdict`] per feature vector
pub struct RiskClassifier {
    strategy: ScoringStrategy,
    heuristic: HeuristicScorer,
}

impl RiskClassifier {
    /// Build a classifier from configuration.
    ///
    /// Never fails: a missing or unreadable artifact, or an ONNX Runtime
    /// initialization fault, leaves the classifier in heuristic mode.
    pub fn from_config(config: &ModelConfig) -> Self {
        let model = match ModelLoader::with_threads(config.onnx_threads) {
            Ok(loader) => loader.load_optional(&config.path),
            Err(e) => {
                warn!(error = %e, "ONNX Runtime unavailable, classifier will run in heuristic mode");
                None
            }
        };

        match model {
            Some(model) => Self::with_model(model),
            None => Self::heuristic_only(),
        }
    }

    pub fn with_model(model: LoadedModel) -> Self {
        Self {
            strategy: ScoringStrategy::Model(RwLock::new(model)),
            heuristic: HeuristicScorer::new(),
        }
    }

    pub fn heuristic_only() -> Self {
        Self {
            strategy: ScoringStrategy::Heuristic,
            heuristic: HeuristicScorer::new(),
        }
    }

    /// Whether a trained model backs this classifier
    pub fn is_model_loaded(&self) -> bool {
        matches!(self.strategy, ScoringStrategy::Model(_))
    }

    /// Score a feature vector into a risk verdict.
    ///
    /// Guaranteed not to raise: a model invocation fault degrades to the
    /// heuristic for this single request. No retry is made on the failing
    /// model call.
    pub fn score(&self, features: &FeatureVector) -> RiskVerdict {
        match &self.strategy {
            ScoringStrategy::Model(lock) => match self.run_model(lock, features) {
                Ok(probability) => self.model_verdict(probability, features.len()),
                Err(e) => {
                    warn!(error = %e, "Model invocation failed, degrading to heuristic");
                    self.heuristic_verdict(features)
                }
            },
            ScoringStrategy::Heuristic => self.heuristic_verdict(features),
        }
    }

    fn model_verdict(&self, probability: f64, feature_count: usize) -> RiskVerdict {
        let decision = if probability > MODEL_REJECT_THRESHOLD {
            Decision::Reject
        } else {
            Decision::Accept
        };

        RiskVerdict {
            probability: round3(probability),
            bucket: RiskBucket::from_probability(probability),
            decision,
            source: VerdictSource::Model,
            feature_count,
        }
    }

    fn heuristic_verdict(&self, features: &FeatureVector) -> RiskVerdict {
        let score = self.heuristic.score(features);
        let decision = if score > HEURISTIC_REJECT_THRESHOLD {
            Decision::Reject
        } else {
            Decision::Accept
        };

        RiskVerdict {
            probability: round3(score),
            bucket: RiskBucket::from_probability(score),
            decision,
            source: VerdictSource::Heuristic,
            feature_count: features.len(),
        }
    }

    /// Run the loaded model over the feature vector
    fn run_model(&self, lock: &RwLock<LoadedModel>, features: &FeatureVector) -> Result<f64> {
        use ort::value::Tensor;

        let mut model = lock
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let input = features.as_f32();
        let shape = vec![1_i64, input.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, input)).context("Failed to create input tensor")?;

        let model_name = model.name.clone();
        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model.session.run(ort::inputs![&input_name => input_tensor])?;

        self.extract_probability(&outputs, &output_name, &model_name)
    }

    /// Extract the default-class probability from model output.
    ///
    /// Handles tensor outputs (probability or label), and seq(map) outputs
    /// as emitted by sklearn-onnx classifier exports.
    fn extract_probability(
        &self,
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
        model_name: &str,
    ) -> Result<f64> {
        // Prefer the probability output by name
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = self.probability_from_tensor(&shape, data);
                debug!(model = %model_name, prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = self.probability_from_sequence_map(output, model_name) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: iterate all outputs and try extraction
        for (name, output) in outputs.iter() {
            let dtype = output.dtype();

            if !name.contains("label") {
                if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                    let (shape, data) = tensor;
                    let prob = self.probability_from_tensor(&shape, data);
                    debug!(model = %model_name, output = %name, prob = prob, "Extracted from tensor (fallback)");
                    return Ok(prob);
                }

                if DynSequenceValueType::can_downcast(&dtype) {
                    if let Ok(prob) = self.probability_from_sequence_map(&output, model_name) {
                        return Ok(prob);
                    }
                }
            }
        }

        // Label-only artifact: treat the predicted class as the probability
        for (name, output) in outputs.iter() {
            if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
                if let Some(&label) = labels.first() {
                    debug!(model = %model_name, output = %name, label = label, "Label-only output, using class as probability");
                    return Ok(if label == 1 { 1.0 } else { 0.0 });
                }
            }
        }

        anyhow::bail!("No probability found in model output")
    }

    /// Extract the default-class probability from seq(map(int64, float))
    fn probability_from_sequence_map(
        &self,
        output: &ort::value::DynValue,
        model_name: &str,
    ) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            return Err(anyhow::anyhow!("Empty sequence"));
        }

        // Batch size is always 1
        let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

        // Class 1 is the default class
        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                debug!(model = %model_name, prob = *prob, "Extracted from seq(map)");
                return Ok(*prob as f64);
            }
        }

        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }

    fn probability_from_tensor(&self, shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes] - default-class probability at index 1
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        }

        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }
}
