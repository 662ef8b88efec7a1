//! Input form state and submission parsing

use crate::error::FormError;
use crate::models::registry::ModelKind;
use crate::types::features::{Feature, FeatureVector};
use std::collections::HashMap;

/// Form field carrying the selected model.
pub const MODEL_FIELD: &str = "model";

/// Smallest increment offered by the numeric inputs.
pub const STEP: f64 = 0.1;

/// Lower bound of every numeric input.
pub const MIN_VALUE: f64 = 0.0;

/// Values shown in the form: defaults on first load, the last submission
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub features: FeatureVector,
    pub model: ModelKind,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            features: FeatureVector::defaults(),
            model: ModelKind::ALL[0],
        }
    }
}

impl FormState {
    /// Parse a urlencoded "Predict" submission. Every feature must be present
    /// and be a finite number no smaller than [`MIN_VALUE`].
    pub fn from_submission(fields: &HashMap<String, String>) -> Result<Self, FormError> {
        let mut features = FeatureVector::defaults();

        for feature in Feature::ALL {
            let raw = fields
                .get(feature.key())
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or(FormError::MissingField(feature.name()))?;

            let value: f64 = raw
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| FormError::NotANumber {
                    field: feature.name(),
                    value: raw.to_string(),
                })?;

            if value < MIN_VALUE {
                return Err(FormError::Negative {
                    field: feature.name(),
                    value,
                });
            }

            features.set(feature, value);
        }

        let model = fields
            .get(MODEL_FIELD)
            .ok_or(FormError::MissingField("Select Model"))?
            .parse()?;

        Ok(Self { features, model })
    }

    /// Best-effort state for re-rendering a rejected submission: keeps
    /// whatever the user typed where it parses.
    pub fn lenient(fields: &HashMap<String, String>) -> Self {
        let mut state = Self::default();
        for feature in Feature::ALL {
            if let Some(value) = fields.get(feature.key()).and_then(|v| v.trim().parse().ok()) {
                state.features.set(feature, value);
            }
        }
        if let Some(model) = fields.get(MODEL_FIELD).and_then(|m| m.parse().ok()) {
            state.model = model;
        }
        state
    }
}
