//! Classifier trait and common types

use async_trait::async_trait;
use hateshield_core::Result;

/// A loaded text classifier
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Raw output of a classifier: the top class and its probability
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Index of the top class
    pub label_id: usize,

    /// Symbolic name of the top class (e.g. `LABEL_1`)
    pub label: String,

    /// Probability of the top class (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label_id: usize, label: impl Into<String>, score: f32) -> Self {
        Self {
            label_id,
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Pick the most probable class out of a probability vector.
    ///
    /// Ties resolve to the lowest index. Returns `None` for an empty vector.
    pub fn from_probabilities(probs: &[f32], labels: &[String]) -> Option<Self> {
        let (label_id, score) = probs
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (idx, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((idx, p)),
            })?;

        let label = labels
            .get(label_id)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", label_id));

        let all_scores = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), probs.get(idx).copied().unwrap_or(0.0)))
            .collect();

        Some(Self {
            label_id,
            label,
            score,
            metadata: ClassificationMetadata {
                all_scores: Some(all_scores),
                ..Default::default()
            },
            latency_us: 0,
        })
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores
    pub all_scores: Option<Vec<(String, f32)>>,
}
