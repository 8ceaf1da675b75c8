//! ONNX artifact loading for the trained credit risk model

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{info, warn};

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name (file stem of the artifact)
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
}

/// Loader for the externally-trained risk model
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a loader with a specific intra-op thread count
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the model artifact from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "credit_risk_model".to_string());

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name,
            session,
            input_name,
            output_name,
        })
    }

    /// Load the model if the artifact is present and readable.
    ///
    /// An absent or unreadable artifact is a supported operating mode, not an
    /// error: the classifier proceeds with the heuristic scorer.
    pub fn load_optional<P: AsRef<Path>>(&self, path: P) -> Option<LoadedModel> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(
                path = %path.display(),
                "Model artifact not found, classifier will run in heuristic mode"
            );
            return None;
        }

        match self.load_model(path) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load model artifact, classifier will run in heuristic mode"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_is_not_an_error() {
        let loader = ModelLoader::new().unwrap();
        assert!(loader.load_optional("models/does_not_exist.onnx").is_none());
    }
}
