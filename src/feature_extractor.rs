//! Feature extraction for model inference.
//!
//! Turns a submitted feature vector into the scaled `f32` row the ONNX
//! classifiers were exported with.

use crate::error::PredictError;
use crate::models::scaler::StandardScaler;
use crate::types::features::{FeatureVector, FEATURE_COUNT};

/// Feature extractor that transforms a case into model input features.
///
/// Matches the preprocessing done in the training pipeline: values in
/// schema order, standardized by the fitted scaler.
pub struct FeatureExtractor {
    scaler: StandardScaler,
}

impl FeatureExtractor {
    /// Create a new feature extractor around a fitted scaler.
    pub fn new(scaler: StandardScaler) -> Self {
        Self { scaler }
    }

    /// Extract the scaled model input row.
    pub fn extract(&self, features: &FeatureVector) -> Result<Vec<f32>, PredictError> {
        let scaled = self.scaler.transform(features.as_slice())?;
        Ok(scaled.into_iter().map(|v| v as f32).collect())
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}
