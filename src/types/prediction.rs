//! Prediction result data structures

use crate::models::registry::ModelKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary risk class predicted by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    /// Class 0: blood loss expected to stay at or below 750 ml
    Low,
    /// Class 1: blood loss > 750 ml expected
    High,
}

impl RiskClass {
    /// Map a classifier label to a risk class. Only 0 and 1 are valid.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(RiskClass::Low),
            1 => Some(RiskClass::High),
            _ => None,
        }
    }

    /// Label used when a model only reports a probability.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.5 {
            RiskClass::High
        } else {
            RiskClass::Low
        }
    }

    pub fn label(self) -> u8 {
        match self {
            RiskClass::Low => 0,
            RiskClass::High => 1,
        }
    }

    /// Verdict shown to the user.
    pub fn verdict(self) -> &'static str {
        match self {
            RiskClass::Low => "Low-risk (Class 0)",
            RiskClass::High => "High-risk (Class 1)",
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskClass::Low => f.write_str("low"),
            RiskClass::High => f.write_str("high"),
        }
    }
}

/// Outcome of one submission. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Correlation id for logs
    pub prediction_id: String,

    /// Model that produced the prediction
    pub model: ModelKind,

    /// Probability of the positive class (0.0 - 1.0)
    pub probability: f64,

    /// Predicted class
    pub risk_class: RiskClass,

    /// Prediction timestamp
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    pub fn new(model: ModelKind, probability: f64, risk_class: RiskClass) -> Self {
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            model,
            probability,
            risk_class,
            timestamp: Utc::now(),
        }
    }

    /// Probability formatted for display.
    pub fn probability_display(&self) -> String {
        format!("{:.2}", self.probability)
    }
}
