//! Mock classifiers and loaders for testing
//!
//! Exercise the inference adapter (lazy loading, retry after a failed load,
//! bulk ordering) without downloading a model.

use async_trait::async_trait;
use hateshield_classifiers::{ClassificationResult, Classifier, InferenceAdapter, ModelLoader};
use hateshield_core::{Category, Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Deterministic classifier: texts containing "hate" are abusive
pub struct MockClassifier {
    name: String,
    score: f32,
    call_count: AtomicU32,
}

impl MockClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0.9,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the probability reported for the predicted class
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if text.contains("EXPLODE") {
            return Err(Error::classifier("Simulated forward pass failure"));
        }

        let label_id = usize::from(text.to_lowercase().contains("hate"));
        Ok(ClassificationResult::new(
            label_id,
            format!("LABEL_{}", label_id),
            self.score,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Loader that counts loads and can fail a configurable number of times
pub struct CountingLoader {
    loads: AtomicU32,
    failures_left: AtomicU32,
    delay: Option<Duration>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self {
            loads: AtomicU32::new(0),
            failures_left: AtomicU32::new(0),
            delay: None,
        }
    }

    /// Fail the first `count` load attempts
    pub fn failing_first(self, count: u32) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Simulate a slow download
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(Error::classifier("model hub unreachable"));
        }

        Ok(Arc::new(MockClassifier::new("mock-muril")))
    }

    fn model_name(&self) -> String {
        "mock-muril".to_string()
    }
}

#[tokio::test]
async fn test_model_loads_lazily() {
    let loader = Arc::new(CountingLoader::new());
    let adapter = InferenceAdapter::from_shared_loader(loader.clone());

    assert!(!adapter.is_ready());
    assert_eq!(loader.loads(), 0);

    adapter.classify_one("hello", "auto").await.unwrap();
    adapter.classify_one("hello again", "auto").await.unwrap();

    assert!(adapter.is_ready());
    assert_eq!(loader.loads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_calls_load_once() {
    let loader = Arc::new(CountingLoader::new().with_delay(Duration::from_millis(50)));
    let adapter = Arc::new(InferenceAdapter::from_shared_loader(loader.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.classify_one(&format!("text {}", i), "en").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(loader.loads(), 1);
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let loader = Arc::new(CountingLoader::new().failing_first(1));
    let adapter = InferenceAdapter::from_shared_loader(loader.clone());

    let err = adapter.classify_one("hello", "auto").await.unwrap_err();
    assert!(err.to_string().contains("model hub unreachable"));
    assert!(!adapter.is_ready());

    adapter.classify_one("hello", "auto").await.unwrap();
    assert!(adapter.is_ready());
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn test_warm_up_loads_model() {
    let loader = Arc::new(CountingLoader::new());
    let adapter = InferenceAdapter::from_shared_loader(loader.clone());

    adapter.warm_up().await.unwrap();
    assert!(adapter.is_ready());

    adapter.classify_one("hello", "auto").await.unwrap();
    assert_eq!(loader.loads(), 1);
    assert_eq!(adapter.model_name(), "mock-muril");
}

#[tokio::test]
async fn test_preloaded_classifier_skips_loader() {
    let loader = Arc::new(CountingLoader::new());
    let classifier = Arc::new(MockClassifier::new("preloaded").with_score(0.75));
    let adapter = InferenceAdapter::with_classifier(loader.clone(), classifier.clone());

    assert!(adapter.is_ready());
    let result = adapter.classify_one("I hate you", "auto").await.unwrap();

    assert_eq!(loader.loads(), 0);
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(result.category, Category::Abusive);
    assert_eq!(result.severity, 0.75);
    assert_eq!(result.confidence, 0.75);
}

#[tokio::test]
async fn test_classify_one_normalizes_output() {
    let adapter = InferenceAdapter::new(CountingLoader::new());

    let abusive = adapter.classify_one("I hate you", "auto").await.unwrap();
    assert!(abusive.is_hate);
    assert_eq!(abusive.category, Category::Abusive);
    assert_eq!(abusive.severity, 0.9);
    assert_eq!(abusive.confidence, 0.9);
    assert_eq!(abusive.language, "unknown");
    assert!(abusive.explanation.unwrap().contains("confidence 0.90"));

    let normal = adapter.classify_one("hello", "ta").await.unwrap();
    assert!(!normal.is_hate);
    assert_eq!(normal.category, Category::NonHate);
    assert_eq!(normal.severity, 0.1);
    assert_eq!(normal.language, "ta");
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let adapter = InferenceAdapter::new(CountingLoader::new());

    let first = adapter.classify_one("I hate you", "en").await.unwrap();
    let second = adapter.classify_one("I hate you", "en").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_classify_many_preserves_order() {
    let adapter = InferenceAdapter::new(CountingLoader::new());
    let texts = vec![
        "hello".to_string(),
        "I hate you".to_string(),
        "good morning".to_string(),
    ];

    let results = adapter.classify_many(&texts, "en").await.unwrap();

    assert_eq!(results.len(), texts.len());
    for (idx, item) in results.iter().enumerate() {
        assert_eq!(item.id, idx);
        assert_eq!(item.text, texts[idx]);
        assert_eq!(item.result.language, "en");
    }
    assert!(results[1].result.is_hate);
}

#[tokio::test]
async fn test_classify_many_empty() {
    let loader = Arc::new(CountingLoader::new());
    let adapter = InferenceAdapter::from_shared_loader(loader.clone());

    let results = adapter.classify_many(&[], "auto").await.unwrap();

    assert!(results.is_empty());
    assert_eq!(loader.loads(), 0);
}

#[tokio::test]
async fn test_classify_many_aborts_on_failure() {
    let classifier = Arc::new(MockClassifier::new("mock"));
    let adapter =
        InferenceAdapter::with_classifier(Arc::new(CountingLoader::new()), classifier.clone());
    let texts = vec![
        "hello".to_string(),
        "EXPLODE".to_string(),
        "never reached".to_string(),
    ];

    let err = adapter.classify_many(&texts, "auto").await.unwrap_err();

    assert!(matches!(err, Error::Classifier(_)));
    assert_eq!(classifier.call_count(), 2);
}
