//! Mapping of raw classifier output to the normalized [`AnalysisResult`]

use crate::classifier::ClassificationResult;
use hateshield_core::types::resolve_language;
use hateshield_core::{AnalysisResult, Category};

/// Label id the model card assigns to abusive text
pub const ABUSIVE_LABEL_ID: usize = 1;

/// Decide whether a predicted class means "abusive".
///
/// `LABEL_0` is normal and `LABEL_1` abusive; names containing `1` or `abus`
/// are also accepted for checkpoints with renamed labels.
pub fn interpret_label(label_id: usize, raw_label: &str) -> Category {
    let label = raw_label.trim().to_lowercase();
    let is_hate = label_id == ABUSIVE_LABEL_ID || label.contains('1') || label.contains("abus");
    Category::from_is_hate(is_hate)
}

/// Severity on a "how abusive" scale: the top-class probability when the
/// verdict is abusive, its complement otherwise.
pub fn severity(category: Category, score: f64) -> f64 {
    let raw = if category.is_hate() { score } else { 1.0 - score };
    round_to(raw.clamp(0.0, 1.0), 2)
}

/// Build the public result for one prediction
pub fn build_result(prediction: &ClassificationResult, language: &str) -> AnalysisResult {
    let score = f64::from(prediction.score);
    let category = interpret_label(prediction.label_id, &prediction.label);
    let polarity = if category.is_hate() { "abusive" } else { "normal" };

    AnalysisResult {
        is_hate: category.is_hate(),
        category,
        severity: severity(category, score),
        language: resolve_language(language),
        confidence: round_to(score.clamp(0.0, 1.0), 3),
        explanation: Some(format!(
            "Model predicted '{}' ({}) with confidence {:.2}.",
            prediction.label, polarity, score
        )),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
