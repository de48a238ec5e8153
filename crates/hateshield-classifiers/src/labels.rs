//! Class label schema read from a model's `config.json`

use hateshield_core::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Number of classes the abuse model must expose (normal, abusive)
pub const EXPECTED_NUM_LABELS: usize = 2;

/// Label fields of a Hugging Face `config.json`
#[derive(Debug, Default, Deserialize)]
struct LabelFields {
    #[serde(default)]
    id2label: Option<HashMap<String, String>>,
    #[serde(default)]
    num_labels: Option<usize>,
}

/// Ordered class names, indexed by label id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    labels: Vec<String>,
}

impl LabelSchema {
    /// Build from explicit names
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Read `id2label` / `num_labels` from a parsed `config.json`.
    ///
    /// Ids missing from `id2label` get the transformers default `LABEL_<i>`.
    pub fn from_config_json(config: &serde_json::Value) -> Result<Self> {
        let fields: LabelFields = serde_json::from_value(config.clone())?;

        let mut id2label = HashMap::new();
        for (key, name) in fields.id2label.unwrap_or_default() {
            let id: usize = key.parse().map_err(|_| {
                Error::classifier(format!("Invalid id2label key '{}' in model config", key))
            })?;
            id2label.insert(id, name);
        }

        let num_labels = fields
            .num_labels
            .or_else(|| id2label.keys().max().map(|max| max + 1))
            .unwrap_or(EXPECTED_NUM_LABELS);

        let labels = (0..num_labels)
            .map(|idx| {
                id2label
                    .remove(&idx)
                    .unwrap_or_else(|| format!("LABEL_{}", idx))
            })
            .collect();

        Ok(Self { labels })
    }

    /// Fail unless the model is a binary normal/abusive classifier
    pub fn ensure_binary(&self) -> Result<()> {
        if self.labels.len() != EXPECTED_NUM_LABELS {
            return Err(Error::classifier(format!(
                "Expected a {}-class abuse model, got {} labels: {:?}",
                EXPECTED_NUM_LABELS,
                self.labels.len(),
                self.labels
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}
