//! HateShield Classifiers
//!
//! Abusive-language classification on top of a pretrained BERT sequence
//! classifier (MuRIL, fine-tuned on Indic and English abuse data).
//!
//! - [`model_loader`] fetches the model from the Hugging Face Hub and maps it
//!   onto Candle
//! - [`analysis`] turns a raw `(label, probability)` prediction into an
//!   [`AnalysisResult`](hateshield_core::AnalysisResult)
//! - [`InferenceAdapter`] owns the loaded model for the process lifetime

pub mod adapter;
pub mod analysis;
pub mod classifier;
pub mod labels;
pub mod model_config;
pub mod model_loader;
pub mod sequence_classifier;

pub use adapter::InferenceAdapter;
pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use labels::LabelSchema;
pub use model_config::{InferenceConfig, ModelConfig, ModelSource};
pub use model_loader::{CandleModelLoader, ModelLoader};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::InferenceAdapter;
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::model_config::ModelConfig;
    pub use crate::model_loader::{CandleModelLoader, ModelLoader};
}
