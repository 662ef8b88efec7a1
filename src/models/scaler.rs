//! Fitted standardization applied to every feature vector before inference

use crate::error::PredictError;
use crate::types::features::{Feature, FEATURE_COUNT};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Scaler artifact as exported from the training environment.
#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    #[serde(default)]
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler from fitted parameters, validating them against the
    /// feature schema.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            bail!(
                "scaler is fitted on {} means and {} scales, expected {}",
                mean.len(),
                scale.len(),
                FEATURE_COUNT
            );
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            bail!("scaler mean for {} is not finite", Feature::ALL[i]);
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            bail!("scaler scale for {} is zero or not finite", Feature::ALL[i]);
        }
        Ok(Self { mean, scale })
    }

    /// Parse a scaler artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ScalerArtifact =
            serde_json::from_str(json).context("Failed to parse scaler artifact")?;

        if !artifact.feature_names.is_empty() {
            let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
            if artifact.feature_names != expected {
                bail!(
                    "scaler feature order {:?} does not match schema {:?}",
                    artifact.feature_names,
                    expected
                );
            }
        }

        Self::new(artifact.mean, artifact.scale)
    }

    /// Load a scaler artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let scaler = Self::from_json(&json)
            .with_context(|| format!("Invalid scaler artifact {}", path.display()))?;

        info!(path = %path.display(), features = scaler.dimension(), "Scaler loaded");
        Ok(scaler)
    }

    /// Number of features the scaler was fitted on.
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row in schema order.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        if row.len() != self.dimension() {
            return Err(PredictError::DimensionMismatch {
                expected: self.dimension(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
