//! Configuration management for the credit decision pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming application records
    pub application_subject: String,
    /// Subject for outgoing fused decisions
    pub decision_subject: String,
}

/// Trained model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX artifact; an absent file means heuristic mode
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_path() -> String {
    "models/credit_risk_model.onnx".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrently processed applications
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                application_subject: "credit.applications".to_string(),
                decision_subject: "credit.decisions".to_string(),
            },
            model: ModelConfig {
                path: default_model_path(),
                onnx_threads: 1,
            },
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.application_subject, "credit.applications");
        assert_eq!(config.model.path, "models/credit_risk_model.onnx");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.pipeline.workers, 4);
    }
}
