//! Model configuration structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Public multilingual (Indic + English) abusive-language model
pub const DEFAULT_MODEL_REPO: &str = "Hate-speech-CNERG/indic-abusive-allInOne-MuRIL";

/// Token budget per text; longer inputs are truncated
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// Configuration for the abuse classification model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model source (where to load from)
    #[serde(default)]
    pub source: ModelSource,

    /// Inference settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Load the model before the server starts accepting requests
    #[serde(default)]
    pub eager_load: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::default(),
            inference: InferenceConfig::default(),
            eager_load: false,
        }
    }
}

impl ModelConfig {
    /// Configuration for a model directory on the local filesystem
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Configuration for a Hugging Face Hub repository
    pub fn from_hf(repo: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo: repo.into(),
                revision: default_revision(),
            },
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.inference.device = device.into();
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.inference.max_length = max_length;
        self
    }

    /// Human-readable identifier of the configured model
    pub fn display_name(&self) -> String {
        match &self.source {
            ModelSource::HuggingFace { repo, revision } if revision == "main" => repo.clone(),
            ModelSource::HuggingFace { repo, revision } => format!("{}@{}", repo, revision),
            ModelSource::Local { path } => path.display().to_string(),
        }
    }
}

/// Model source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },

    /// Load from local filesystem
    Local { path: PathBuf },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::HuggingFace {
            repo: DEFAULT_MODEL_REPO.to_string(),
            revision: default_revision(),
        }
    }
}

fn default_revision() -> String {
    "main".to_string()
}

/// Inference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Device to run on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}
