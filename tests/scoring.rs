//! ONNX scoring path, exercised on the small graphs in `tests/fixtures/`.
//!
//! Both graphs compute `p = sigmoid(sum(row))` over a `[N, 8]` float input
//! and emit the label as `ArgMax([1 - p, p])` in the same run:
//! - `sum_sigmoid_tensor.onnx`: `label` (int64) and `probabilities` (`[N, 2]`),
//!   the onnxmltools layout.
//! - `sum_sigmoid_zipmap.onnx`: `output_label` (int64) and
//!   `output_probability` (`seq(map(int64, float))`), the skl2onnx ZipMap layout.

use blood_loss_risk::models::loader::LoadedModel;
use blood_loss_risk::models::{ModelKind, ModelLoader, ModelRegistry, Scorer, StandardScaler};
use blood_loss_risk::types::features::{FeatureVector, FEATURE_COUNT};
use blood_loss_risk::types::prediction::RiskClass;
use blood_loss_risk::{FeatureExtractor, InferenceEngine};
use std::path::{Path, PathBuf};

const TENSOR_GRAPH: &str = "sum_sigmoid_tensor.onnx";
const ZIPMAP_GRAPH: &str = "sum_sigmoid_zipmap.onnx";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str, kind: ModelKind) -> LoadedModel {
    ModelLoader::with_threads(1)
        .unwrap()
        .load_model(fixture(name), kind)
        .unwrap()
}

fn sigmoid_of_sum(row: &[f32]) -> f64 {
    let sum: f32 = row.iter().sum();
    1.0 / (1.0 + (-(sum as f64)).exp())
}

#[test]
fn endpoint_names_are_discovered() {
    let tensor = load(TENSOR_GRAPH, ModelKind::XGBoost);
    assert_eq!(tensor.input_name, "float_input");
    assert_eq!(tensor.probability_output, "probabilities");
    assert_eq!(tensor.label_output.as_deref(), Some("label"));

    let zipmap = load(ZIPMAP_GRAPH, ModelKind::RandomForest);
    assert_eq!(zipmap.input_name, "float_input");
    assert_eq!(zipmap.probability_output, "output_probability");
    assert_eq!(zipmap.label_output.as_deref(), Some("output_label"));
}

#[test]
fn tensor_output_reads_positive_column() {
    let model = load(TENSOR_GRAPH, ModelKind::XGBoost);

    let high = [0.25_f32; FEATURE_COUNT];
    let score = model.score(&high).unwrap();
    assert!((score.probability - sigmoid_of_sum(&high)).abs() < 1e-5);
    assert_eq!(score.risk_class, RiskClass::High);

    let low = [-0.25_f32; FEATURE_COUNT];
    let score = model.score(&low).unwrap();
    assert!((score.probability - sigmoid_of_sum(&low)).abs() < 1e-5);
    assert_eq!(score.risk_class, RiskClass::Low);
}

#[test]
fn zipmap_output_reads_class_one_entry() {
    let zipmap = load(ZIPMAP_GRAPH, ModelKind::RandomForest);
    let tensor = load(TENSOR_GRAPH, ModelKind::XGBoost);

    let row = [0.1_f32, 0.4, -0.2, 0.3, 0.0, 0.05, -0.1, 0.2];
    let from_map = zipmap.score(&row).unwrap();
    let from_tensor = tensor.score(&row).unwrap();

    assert!((from_map.probability - sigmoid_of_sum(&row)).abs() < 1e-5);
    assert!((from_map.probability - from_tensor.probability).abs() < 1e-7);
    assert_eq!(from_map.risk_class, RiskClass::High);
    assert_eq!(from_map.risk_class, from_tensor.risk_class);
}

#[test]
fn label_is_taken_from_the_graph() {
    // sigmoid(0) = 0.5 ties the two classes; ArgMax picks class 0, while a
    // 0.5 threshold on the probability would have said class 1.
    for (graph, kind) in [(TENSOR_GRAPH, ModelKind::XGBoost), (ZIPMAP_GRAPH, ModelKind::Svm)] {
        let model = load(graph, kind);
        let score = model.score(&[0.0; FEATURE_COUNT]).unwrap();

        assert_eq!(score.probability, 0.5, "{graph}");
        assert_eq!(score.risk_class, RiskClass::Low, "{graph}");
        assert_eq!(RiskClass::from_probability(score.probability), RiskClass::High);
    }
}

#[test]
fn wrong_row_width_is_a_prediction_error() {
    let model = load(ZIPMAP_GRAPH, ModelKind::Knn);
    assert!(model.score(&[0.0; FEATURE_COUNT + 1]).is_err());
}

#[test]
fn engine_runs_every_model_kind_on_fixture_graphs() {
    let loader = ModelLoader::with_threads(1).unwrap();
    let registry = ModelRegistry::build(|kind| {
        let graph = match kind {
            ModelKind::XGBoost | ModelKind::Svm => TENSOR_GRAPH,
            _ => ZIPMAP_GRAPH,
        };
        Ok(Box::new(loader.load_model(fixture(graph), kind)?) as Box<dyn Scorer>)
    })
    .unwrap();

    // Centred on the defaults, so the default vector scales to all zeros
    let mean = FeatureVector::defaults().as_slice().to_vec();
    let scaler = StandardScaler::new(mean, vec![0.001; FEATURE_COUNT]).unwrap();

    let scenario =
        FeatureVector::from_values([110.55, 232.08, 341.33, 167.24, 5.34, 18.39, 23.73, 681.02]);
    let row = FeatureExtractor::new(scaler.clone()).extract(&scenario).unwrap();
    let engine = InferenceEngine::new(registry, FeatureExtractor::new(scaler));

    for kind in ModelKind::ALL {
        let defaults = engine.predict(kind, &FeatureVector::defaults()).unwrap();
        assert_eq!(defaults.model, kind);
        assert_eq!(defaults.probability, 0.5, "{kind}");
        assert_eq!(defaults.risk_class, RiskClass::Low, "{kind}");

        let first = engine.predict(kind, &scenario).unwrap();
        let second = engine.predict(kind, &scenario).unwrap();
        assert_eq!(first.probability, second.probability, "{kind}");
        assert_eq!(first.risk_class, second.risk_class, "{kind}");
        assert!((first.probability - sigmoid_of_sum(&row)).abs() < 1e-5, "{kind}");
        assert_eq!(first.risk_class, RiskClass::High, "{kind}");

        let zeros = FeatureVector::from_values([0.0; FEATURE_COUNT]);
        let result = engine.predict(kind, &zeros).unwrap();
        assert!(result.probability < 1e-6, "{kind}");
        assert_eq!(result.risk_class, RiskClass::Low, "{kind}");
    }
}
