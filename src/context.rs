//! Load-once application context

use crate::advice::AdvisoryCatalog;
use crate::config::AppConfig;
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::InferenceEngine;
use crate::models::loader::ModelLoader;
use crate::models::scaler::StandardScaler;
use anyhow::{Context, Result};
use tracing::info;

/// Everything a request needs, built once at startup and never mutated.
pub struct AppContext {
    pub engine: InferenceEngine,
    pub advice: AdvisoryCatalog,
}

impl AppContext {
    pub fn new(engine: InferenceEngine, advice: AdvisoryCatalog) -> Self {
        Self { engine, advice }
    }

    /// Read every artifact. Any failure is fatal: there is no mode in which
    /// only some models are served.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let scaler_path = config.artifacts.scaler_path();
        let scaler = StandardScaler::load(&scaler_path)
            .with_context(|| format!("Failed to load scaler {}", scaler_path.display()))?;

        let loader = ModelLoader::with_threads(config.artifacts.onnx_threads)?;
        let registry = loader
            .load_registry(config.artifacts.models_path())
            .context("Failed to load model registry")?;

        let advice = AdvisoryCatalog::builtin()?;

        let extractor = FeatureExtractor::new(scaler);
        info!(
            models = registry.len(),
            features = extractor.feature_count(),
            "Application context ready"
        );

        Ok(Self::new(InferenceEngine::new(registry, extractor), advice))
    }
}
