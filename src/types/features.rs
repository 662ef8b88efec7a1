//! Clinical feature schema and per-case feature vectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of clinical features expected by the scaler and every model.
pub const FEATURE_COUNT: usize = 8;

/// One of the eight clinical measurements, in the order the scaler and the
/// classifiers were fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    InitialHb,
    InitialPlt,
    TimeToSurgery,
    SurgeryDuration,
    TbsaGrafted,
    TbsaExcised,
    TbsaExcisedAndGrafted,
    RbcTransfused,
}

impl Feature {
    /// All features in schema order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::InitialHb,
        Feature::InitialPlt,
        Feature::TimeToSurgery,
        Feature::SurgeryDuration,
        Feature::TbsaGrafted,
        Feature::TbsaExcised,
        Feature::TbsaExcisedAndGrafted,
        Feature::RbcTransfused,
    ];

    /// Position of this feature in the model input row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used during training.
    pub fn name(self) -> &'static str {
        match self {
            Feature::InitialHb => "Initial Hb",
            Feature::InitialPlt => "Initial PLT",
            Feature::TimeToSurgery => "Time to start surgery after injury",
            Feature::SurgeryDuration => "Duration of surgery",
            Feature::TbsaGrafted => "TBSA grafted",
            Feature::TbsaExcised => "TBSA excised",
            Feature::TbsaExcisedAndGrafted => "TBSA excised and grafted",
            Feature::RbcTransfused => "Amount of RBCs transfused during surgery",
        }
    }

    /// Form field key.
    pub fn key(self) -> &'static str {
        match self {
            Feature::InitialHb => "initial_hb",
            Feature::InitialPlt => "initial_plt",
            Feature::TimeToSurgery => "time_to_surgery",
            Feature::SurgeryDuration => "surgery_duration",
            Feature::TbsaGrafted => "tbsa_grafted",
            Feature::TbsaExcised => "tbsa_excised",
            Feature::TbsaExcisedAndGrafted => "tbsa_excised_and_grafted",
            Feature::RbcTransfused => "rbc_transfused",
        }
    }

    /// Population mean of the training cohort, used to seed the form.
    pub fn default_value(self) -> f64 {
        match self {
            Feature::InitialHb => 110.551020,
            Feature::InitialPlt => 232.081633,
            Feature::TimeToSurgery => 341.330612,
            Feature::SurgeryDuration => 167.236735,
            Feature::TbsaGrafted => 5.336735,
            Feature::TbsaExcised => 18.391837,
            Feature::TbsaExcisedAndGrafted => 23.728571,
            Feature::RbcTransfused => 681.020408,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of all eight features for one case, stored in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build a vector from values already in schema order.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Vector with every feature at its population mean.
    pub fn defaults() -> Self {
        Self {
            values: Feature::ALL.map(Feature::default_value),
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Positional row handed to the scaler.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// (feature, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::defaults()
    }
}
