//! Type definitions for the blood loss risk predictor

pub mod features;
pub mod prediction;

pub use features::{Feature, FeatureVector, FEATURE_COUNT};
pub use prediction::{PredictionResult, RiskClass};
