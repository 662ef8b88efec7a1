//! Request-path error types
//!
//! Startup failures are fatal and travel as `anyhow::Error`; the types here
//! cover what can go wrong while serving a submission.

use thiserror::Error;

/// Failure while scaling a feature vector or running a classifier.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model {model} produced no {output} output")]
    MissingOutput { model: String, output: &'static str },

    #[error("model {model} returned label {label}, expected 0 or 1")]
    InvalidLabel { model: String, label: i64 },

    #[error("model {model} returned probability {probability} outside [0, 1]")]
    InvalidProbability { model: String, probability: f64 },

    #[error("session lock poisoned for model {0}")]
    LockPoisoned(String),

    #[error("onnx runtime error: {0}")]
    Runtime(#[from] ort::Error),

    #[error("inference task failed: {0}")]
    Task(String),
}

/// Rejected form submission.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be 0.0 or greater, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("unknown model {0:?}")]
    UnknownModel(String),
}
