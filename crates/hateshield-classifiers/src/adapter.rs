//! Process-wide inference adapter
//!
//! Owns the (lazily) loaded classifier and turns raw predictions into
//! [`AnalysisResult`]s. The model is loaded at most once: concurrent first
//! callers wait on the same load, and a failed load leaves the adapter empty
//! so the next call retries.

use crate::analysis::build_result;
use crate::classifier::Classifier;
use crate::model_loader::ModelLoader;
use hateshield_core::{AnalysisResult, BulkItemResult, Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

pub struct InferenceAdapter {
    loader: Arc<dyn ModelLoader>,
    classifier: OnceCell<Arc<dyn Classifier>>,
}

impl InferenceAdapter {
    /// Create an adapter that loads on first use
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self::from_shared_loader(Arc::new(loader))
    }

    pub fn from_shared_loader(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            classifier: OnceCell::new(),
        }
    }

    /// Create an adapter around an already-loaded classifier
    pub fn with_classifier(
        loader: Arc<dyn ModelLoader>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            loader,
            classifier: OnceCell::new_with(Some(classifier)),
        }
    }

    /// Whether the model has been loaded
    pub fn is_ready(&self) -> bool {
        self.classifier.initialized()
    }

    pub fn model_name(&self) -> String {
        self.loader.model_name()
    }

    /// Load the model now instead of on the first request
    pub async fn warm_up(&self) -> Result<()> {
        self.classifier().await.map(|_| ())
    }

    async fn classifier(&self) -> Result<&Arc<dyn Classifier>> {
        self.classifier
            .get_or_try_init(|| async {
                let start = Instant::now();
                tracing::info!("Loading model: {}", self.loader.model_name());

                let classifier = self.loader.load().await.map_err(|e| {
                    tracing::error!("Model load failed: {}", e);
                    e
                })?;

                tracing::info!(
                    "Model loaded successfully in {} ms",
                    start.elapsed().as_millis()
                );
                Ok::<_, Error>(classifier)
            })
            .await
    }

    /// Classify one text and normalize the prediction
    pub async fn classify_one(&self, text: &str, language: &str) -> Result<AnalysisResult> {
        let classifier = self.classifier().await?;
        let prediction = classifier.classify(text).await?;

        metrics::histogram!("hateshield_inference_latency_us").record(prediction.latency_us as f64);

        let result = build_result(&prediction, language);
        metrics::counter!(
            "hateshield_texts_analyzed_total",
            "category" => result.category.as_str()
        )
        .increment(1);

        Ok(result)
    }

    /// Classify texts one after another, in order.
    ///
    /// The first failure aborts the whole batch.
    pub async fn classify_many(
        &self,
        texts: &[String],
        language: &str,
    ) -> Result<Vec<BulkItemResult>> {
        let mut results = Vec::with_capacity(texts.len());

        for (id, text) in texts.iter().enumerate() {
            let result = self.classify_one(text, language).await?;
            results.push(BulkItemResult {
                id,
                text: text.clone(),
                result,
            });
        }

        Ok(results)
    }
}
