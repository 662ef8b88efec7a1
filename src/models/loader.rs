//! ONNX model loader

use crate::models::registry::{ModelKind, ModelRegistry, Scorer};
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Loaded ONNX classifier with the names of its graph endpoints
pub struct LoadedModel {
    /// Which classifier this session holds
    pub kind: ModelKind,
    /// ONNX Runtime session; `run` needs exclusive access
    pub session: Mutex<Session>,
    /// Input name for the feature row
    pub input_name: String,
    /// Output name for class probabilities
    pub probability_output: String,
    /// Output name for the predicted label, when the graph exposes one
    pub label_output: Option<String>,
}

/// Loader for ONNX classifiers
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single classifier from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, kind: ModelKind) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %kind.slug(), path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load {} from {}", kind, path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx names these `output_label` / `output_probability`,
        // onnxmltools uses `label` / `probabilities`.
        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.iter().find(|o| !o.name.contains("label")))
            .map(|o| o.name.clone())
            .with_context(|| format!("{} has no probability output", kind))?;

        info!(
            model = %kind.slug(),
            input = %input_name,
            probability = %probability_output,
            label = ?label_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            kind,
            session: Mutex::new(session),
            input_name,
            probability_output,
            label_output,
        })
    }

    /// Load all six classifiers from a directory. A missing or unreadable
    /// artifact fails the whole load.
    pub fn load_registry<P: AsRef<Path>>(&self, models_dir: P) -> Result<ModelRegistry> {
        let models_dir = models_dir.as_ref();

        let registry = ModelRegistry::build(|kind| {
            let path = models_dir.join(kind.file_name());
            if !path.exists() {
                anyhow::bail!("Model file for {} not found at {}", kind, path.display());
            }
            let model = self.load_model(&path, kind)?;
            Ok(Box::new(model) as Box<dyn Scorer>)
        })?;

        info!(
            count = registry.len(),
            "Loaded {} models from {}",
            registry.len(),
            models_dir.display()
        );

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_fails_registry_load() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModelLoader::with_threads(1).unwrap();

        let err = loader.load_registry(dir.path()).err().unwrap();
        assert!(err.to_string().contains("lr.onnx"));
    }

    #[test]
    fn test_corrupt_artifact_fails_model_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ModelKind::Knn.file_name());
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let loader = ModelLoader::with_threads(1).unwrap();
        assert!(loader.load_model(&path, ModelKind::Knn).is_err());
    }
}
