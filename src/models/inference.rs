//! Inference pipeline: scale the submitted vector, run the selected model

use crate::error::PredictError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::loader::LoadedModel;
use crate::models::registry::{ModelKind, ModelRegistry, Score, Scorer};
use crate::types::features::FeatureVector;
use crate::types::prediction::{PredictionResult, RiskClass};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use tracing::debug;

/// Runs one classifier on one scaled feature vector.
pub struct InferenceEngine {
    registry: ModelRegistry,
    extractor: FeatureExtractor,
}

impl InferenceEngine {
    pub fn new(registry: ModelRegistry, extractor: FeatureExtractor) -> Self {
        Self {
            registry,
            extractor,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Scale `features` and ask `kind` for its probability and label.
    pub fn predict(
        &self,
        kind: ModelKind,
        features: &FeatureVector,
    ) -> Result<PredictionResult, PredictError> {
        let row = self.extractor.extract(features)?;
        let score = self.registry.get(kind).score(&row)?;

        debug!(
            model = %kind.slug(),
            probability = score.probability,
            risk_class = %score.risk_class,
            "Inference complete"
        );

        Ok(PredictionResult::new(kind, score.probability, score.risk_class))
    }
}

impl Scorer for LoadedModel {
    fn score(&self, row: &[f32]) -> Result<Score, PredictError> {
        let model_name = self.kind.slug().to_string();

        // Shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor = Tensor::from_array((shape, row.to_vec()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::LockPoisoned(model_name.clone()))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let probability_value =
            outputs
                .get(self.probability_output.as_str())
                .ok_or_else(|| PredictError::MissingOutput {
                    model: model_name.clone(),
                    output: "probability",
                })?;
        let probability = extract_probability(probability_value, &model_name)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::InvalidProbability {
                model: model_name,
                probability,
            });
        }

        let risk_class = match self.label_output.as_deref().and_then(|name| outputs.get(name)) {
            Some(label_value) => {
                let label = extract_label(label_value, &model_name)?;
                RiskClass::from_label(label).ok_or(PredictError::InvalidLabel {
                    model: model_name.clone(),
                    label,
                })?
            }
            None => RiskClass::from_probability(probability),
        };

        Ok(Score {
            probability,
            risk_class,
        })
    }
}

/// Extract the positive-class probability.
/// Handles tensor outputs and the seq(map) outputs produced by ZipMap.
fn extract_probability(output: &DynValue, model_name: &str) -> Result<f64, PredictError> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let prob = positive_class_from_tensor(&dims, data).ok_or_else(|| {
            PredictError::MissingOutput {
                model: model_name.to_string(),
                output: "probability",
            }
        })?;
        debug!(model = %model_name, prob = prob, "Extracted from tensor");
        return Ok(prob);
    }

    if DynSequenceValueType::can_downcast(&output.dtype()) {
        return extract_from_sequence_map(output, model_name);
    }

    Err(PredictError::MissingOutput {
        model: model_name.to_string(),
        output: "probability",
    })
}

/// Extract probability from seq(map(int64, float)), batch size 1.
fn extract_from_sequence_map(output: &DynValue, model_name: &str) -> Result<f64, PredictError> {
    let allocator = Allocator::default();
    let missing = || PredictError::MissingOutput {
        model: model_name.to_string(),
        output: "probability",
    };

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|_| missing())?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or_else(missing)?;
    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
        debug!(model = %model_name, prob = *prob, "Extracted from seq(map)");
        return Ok(*prob as f64);
    }
    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
        return Ok(1.0 - *prob as f64);
    }

    Err(missing())
}

/// Positive-class probability from a `[batch, classes]` or `[classes]` tensor.
fn positive_class_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let classes = match dims {
        [_, classes] | [classes] => *classes,
        _ => return None,
    };

    match classes {
        c if c >= 2 => data.get(1).map(|&p| p as f64),
        1 => data.first().map(|&p| p as f64),
        _ => None,
    }
}

fn extract_label(output: &DynValue, model_name: &str) -> Result<i64, PredictError> {
    let missing = || PredictError::MissingOutput {
        model: model_name.to_string(),
        output: "label",
    };

    // XGBoost exports emit int64 labels, some converters emit int32
    if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
        return data.first().copied().ok_or_else(missing);
    }
    if let Ok((_, data)) = output.try_extract_tensor::<i32>() {
        return data.first().map(|&l| l as i64).ok_or_else(missing);
    }

    Err(missing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registry::tests::fixed_registry;
    use crate::models::scaler::StandardScaler;
    use crate::types::features::{Feature, FEATURE_COUNT};

    fn engine() -> InferenceEngine {
        let scaler =
            StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap();
        InferenceEngine::new(fixed_registry(), FeatureExtractor::new(scaler))
    }

    #[test]
    fn test_default_vector_for_every_model() {
        let engine = engine();
        let features = FeatureVector::defaults();

        for kind in ModelKind::ALL {
            let result = engine.predict(kind, &features).unwrap();
            assert_eq!(result.model, kind);
            assert!((0.0..=1.0).contains(&result.probability));
            assert!(result.risk_class.label() <= 1);
        }
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let engine = engine();
        let features = FeatureVector::defaults().with(Feature::InitialHb, 95.0);

        let first = engine.predict(ModelKind::RandomForest, &features).unwrap();
        let second = engine.predict(ModelKind::RandomForest, &features).unwrap();

        assert_eq!(first.probability, second.probability);
        assert_eq!(first.risk_class, second.risk_class);
        assert_ne!(first.prediction_id, second.prediction_id);
    }

    #[test]
    fn test_all_zero_vector() {
        let engine = engine();
        let zeros = FeatureVector::from_values([0.0; FEATURE_COUNT]);
        assert!(engine.predict(ModelKind::Knn, &zeros).is_ok());
    }

    #[test]
    fn test_positive_class_from_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 2], &[0.25, 0.75]), Some(0.75));
        assert_eq!(positive_class_from_tensor(&[2], &[0.4, 0.6]), Some(0.6f32 as f64));
        assert_eq!(positive_class_from_tensor(&[1, 1], &[0.5]), Some(0.5));
        assert_eq!(positive_class_from_tensor(&[1, 2, 1], &[0.5, 0.5]), None);
        assert_eq!(positive_class_from_tensor(&[1, 2], &[0.5]), None);
    }
}
