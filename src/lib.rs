//! Blood Loss Risk Predictor Library
//!
//! Predicts the risk of intraoperative blood loss > 750 ml during burn
//! surgery from eight clinical measurements, using one of six pre-trained
//! classifiers exported to ONNX, and serves the result as a single-page form.

pub mod advice;
pub mod config;
pub mod context;
pub mod error;
pub mod feature_extractor;
pub mod form;
pub mod metrics;
pub mod models;
pub mod render;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use context::AppContext;
pub use feature_extractor::FeatureExtractor;
pub use models::inference::InferenceEngine;
pub use models::registry::ModelKind;
pub use types::{features::FeatureVector, prediction::PredictionResult};
