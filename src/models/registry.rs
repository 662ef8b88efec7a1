//! Supported classifiers and the registry that owns them

use crate::error::{FormError, PredictError};
use crate::types::prediction::RiskClass;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six pre-trained classifiers offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    #[serde(rename = "xgboost")]
    XGBoost,
    DecisionTree,
    Svm,
    Knn,
    RandomForest,
}

impl ModelKind {
    /// Selector order.
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LogisticRegression,
        ModelKind::XGBoost,
        ModelKind::DecisionTree,
        ModelKind::Svm,
        ModelKind::Knn,
        ModelKind::RandomForest,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::XGBoost => "XGBoost",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::Svm => "SVM",
            ModelKind::Knn => "KNN",
            ModelKind::RandomForest => "Random Forest",
        }
    }

    /// Form value and log identifier.
    pub fn slug(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::XGBoost => "xgboost",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::Svm => "svm",
            ModelKind::Knn => "knn",
            ModelKind::RandomForest => "random_forest",
        }
    }

    /// Artifact file name inside the models directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "lr.onnx",
            ModelKind::XGBoost => "xgb.onnx",
            ModelKind::DecisionTree => "dt.onnx",
            ModelKind::Svm => "svc.onnx",
            ModelKind::Knn => "knn.onnx",
            ModelKind::RandomForest => "rf.onnx",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = FormError;

    /// Accepts either the display name or the slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ModelKind::ALL
            .into_iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(needle)
                    || kind.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| FormError::UnknownModel(s.to_string()))
    }
}

/// Probability and label produced by one forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Probability of class 1
    pub probability: f64,
    pub risk_class: RiskClass,
}

/// A fitted binary classifier.
///
/// Implementations take an already-scaled row in schema order and must
/// return the probability and the label of the same evaluation.
pub trait Scorer: Send + Sync {
    fn score(&self, row: &[f32]) -> Result<Score, PredictError>;
}

/// Every supported classifier, loaded once at startup.
pub struct ModelRegistry {
    scorers: Vec<Box<dyn Scorer>>,
}

impl ModelRegistry {
    /// Load a scorer for every kind. Any failure aborts the build so the
    /// selector never lists a model that cannot run.
    pub fn build<F>(mut load: F) -> Result<Self>
    where
        F: FnMut(ModelKind) -> Result<Box<dyn Scorer>>,
    {
        let scorers = ModelKind::ALL
            .into_iter()
            .map(&mut load)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { scorers })
    }

    pub fn get(&self, kind: ModelKind) -> &dyn Scorer {
        self.scorers[kind.index()].as_ref()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ModelKind> {
        ModelKind::ALL.into_iter()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Scorer returning a fixed answer, standing in for an ONNX session.
    pub(crate) struct FixedScorer {
        pub probability: f64,
    }

    impl Scorer for FixedScorer {
        fn score(&self, _row: &[f32]) -> Result<Score, PredictError> {
            Ok(Score {
                probability: self.probability,
                risk_class: RiskClass::from_probability(self.probability),
            })
        }
    }

    pub(crate) fn fixed_registry() -> ModelRegistry {
        ModelRegistry::build(|kind| {
            let probability = match kind {
                ModelKind::RandomForest | ModelKind::XGBoost => 0.82,
                _ => 0.17,
            };
            Ok(Box::new(FixedScorer { probability }) as Box<dyn Scorer>)
        })
        .unwrap()
    }

    #[test]
    fn test_parse_model_kind() {
        assert_eq!("Random Forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("random_forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("svm".parse::<ModelKind>().unwrap(), ModelKind::Svm);
        assert_eq!("XGBOOST".parse::<ModelKind>().unwrap(), ModelKind::XGBoost);
        assert_eq!(
            "Random Forrest".parse::<ModelKind>(),
            Err(FormError::UnknownModel("Random Forrest".to_string()))
        );
    }

    #[test]
    fn test_file_names_are_unique() {
        let mut files: Vec<&str> = ModelKind::ALL.iter().map(|k| k.file_name()).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 6);
    }

    #[test]
    fn test_registry_is_complete() {
        let registry = fixed_registry();
        assert_eq!(registry.len(), 6);
        let score = registry.get(ModelKind::RandomForest).score(&[0.0; 8]).unwrap();
        assert_eq!(score.risk_class, RiskClass::High);
        let score = registry.get(ModelKind::Knn).score(&[0.0; 8]).unwrap();
        assert_eq!(score.risk_class, RiskClass::Low);
    }

    #[test]
    fn test_registry_build_fails_on_any_load_error() {
        let mut attempted = Vec::new();
        let result = ModelRegistry::build(|kind| {
            attempted.push(kind);
            if kind == ModelKind::Svm {
                anyhow::bail!("corrupt artifact");
            }
            Ok(Box::new(FixedScorer { probability: 0.3 }) as Box<dyn Scorer>)
        });

        assert!(result.is_err());
        assert_eq!(attempted.last(), Some(&ModelKind::Svm));
    }
}
