//! Pre-trained classifier and scaler components

pub mod inference;
pub mod loader;
pub mod registry;
pub mod scaler;

pub use inference::InferenceEngine;
pub use loader::ModelLoader;
pub use registry::{ModelKind, ModelRegistry, Score, Scorer};
pub use scaler::StandardScaler;
