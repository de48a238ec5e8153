//! BERT sequence classifier running on Candle

use crate::classifier::{ClassificationResult, Classifier};
use crate::labels::LabelSchema;
use async_trait::async_trait;
use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module};
use candle_transformers::models::bert::BertModel;
use hateshield_core::{Error, Result};
use std::time::Instant;
use tokenizers::Tokenizer;

/// `BertForSequenceClassification`: encoder, pooler over `[CLS]`, linear head.
///
/// The tokenizer is expected to already carry its truncation settings.
pub struct BertSequenceClassifier {
    pub(crate) name: String,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) model: BertModel,
    pub(crate) pooler: Linear,
    pub(crate) classifier: Linear,
    pub(crate) device: Device,
    pub(crate) labels: LabelSchema,
}

impl BertSequenceClassifier {
    fn logits(&self, text: &str) -> Result<Tensor> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        let input_ids = self.row_tensor(encoding.get_ids(), "input ids")?;
        let token_type_ids = self.row_tensor(encoding.get_type_ids(), "token type ids")?;
        let attention_mask = self.row_tensor(encoding.get_attention_mask(), "attention mask")?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        let cls_embedding = hidden_states
            .i((.., 0))
            .map_err(|e| Error::classifier(format!("Failed to get CLS token: {}", e)))?;

        let pooled = self
            .pooler
            .forward(&cls_embedding)
            .and_then(|t| t.tanh())
            .map_err(|e| Error::classifier(format!("Pooler failed: {}", e)))?;

        self.classifier
            .forward(&pooled)
            .map_err(|e| Error::classifier(format!("Classification head failed: {}", e)))
    }

    fn row_tensor(&self, values: &[u32], what: &str) -> Result<Tensor> {
        Tensor::new(values, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to build {} tensor: {}", what, e)))
    }
}

#[async_trait]
impl Classifier for BertSequenceClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let logits = self.logits(text)?;
        let probs = to_probabilities(&logits)?;

        let mut result = ClassificationResult::from_probabilities(&probs, self.labels.as_slice())
            .ok_or_else(|| Error::classifier("Model returned no class scores"))?;
        result.metadata.model = Some(self.name.clone());
        result.latency_us = start.elapsed().as_micros() as u64;

        tracing::debug!(
            label = %result.label,
            score = result.score,
            latency_us = result.latency_us,
            "Classified text"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Softmax over the class dimension of a `(1, num_labels)` logits tensor
pub(crate) fn to_probabilities(logits: &Tensor) -> Result<Vec<f32>> {
    candle_nn::ops::softmax(logits, D::Minus1)
        .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?
        .squeeze(0)
        .map_err(|e| Error::classifier(format!("Squeeze failed: {}", e)))?
        .to_vec1()
        .map_err(|e| Error::classifier(format!("Failed to convert to vec: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_probabilities_sums_to_one() {
        let logits = Tensor::new(&[[1.0f32, 3.0]], &Device::Cpu).unwrap();
        let probs = to_probabilities(&logits).unwrap();

        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn test_to_probabilities_equal_logits() {
        let logits = Tensor::new(&[[0.0f32, 0.0]], &Device::Cpu).unwrap();
        let probs = to_probabilities(&logits).unwrap();

        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }
}
