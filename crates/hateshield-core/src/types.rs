//! Request, response, and result types for HateShield

use crate::error::{Error, FieldError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language hint meaning "detect it yourself"
pub const AUTO_LANGUAGE: &str = "auto";

/// Language reported when the caller sent [`AUTO_LANGUAGE`]
pub const UNKNOWN_LANGUAGE: &str = "unknown";

fn default_language() -> String {
    AUTO_LANGUAGE.to_string()
}

/// Coarse two-valued verdict for a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Abusive,
    NonHate,
}

impl Category {
    /// Category matching an abusive/non-abusive verdict
    pub fn from_is_hate(is_hate: bool) -> Self {
        if is_hate {
            Self::Abusive
        } else {
            Self::NonHate
        }
    }

    pub fn is_hate(&self) -> bool {
        matches!(self, Self::Abusive)
    }

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abusive => "ABUSIVE",
            Self::NonHate => "NON_HATE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized verdict for a single text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// True when the text was judged abusive
    pub is_hate: bool,

    /// Always `Abusive` iff `is_hate`
    pub category: Category,

    /// How abusive the text is (0.0-1.0, two decimals)
    pub severity: f64,

    /// Echo of the request language, `"unknown"` for `"auto"`
    pub language: String,

    /// Top-class probability (0.0-1.0, three decimals)
    pub confidence: f64,

    /// Human-readable summary of the prediction
    pub explanation: Option<String>,
}

/// Resolve the language reported back to the caller
pub fn resolve_language(language: &str) -> String {
    if language == AUTO_LANGUAGE {
        UNKNOWN_LANGUAGE.to_string()
    } else {
        language.to_string()
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to analyze (must be non-empty)
    pub text: String,

    /// Language code or `"auto"`
    #[serde(default = "default_language")]
    pub language: String,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check field constraints that deserialization alone cannot express
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "text",
                "String should have at least 1 character",
            )
            .with_kind("string_too_short")]));
        }
        Ok(())
    }
}

/// Body of `POST /analyze/bulk`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAnalyzeRequest {
    /// Texts to analyze, in order (may be empty)
    pub texts: Vec<String>,

    /// Language applied to every text
    #[serde(default = "default_language")]
    pub language: String,
}

impl BulkAnalyzeRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Body returned by `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
}

/// One entry of a bulk response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    /// Zero-based position of the text in the request
    pub id: usize,

    /// Echo of the analyzed text
    pub text: String,

    pub result: AnalysisResult,
}

/// Body returned by `POST /analyze/bulk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalyzeResponse {
    pub results: Vec<BulkItemResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::Abusive).unwrap(),
            "\"ABUSIVE\""
        );
        assert_eq!(
            serde_json::to_string(&Category::NonHate).unwrap(),
            "\"NON_HATE\""
        );
        assert_eq!(Category::NonHate.to_string(), "NON_HATE");
    }

    #[test]
    fn test_category_tracks_is_hate() {
        assert!(Category::from_is_hate(true).is_hate());
        assert!(!Category::from_is_hate(false).is_hate());
    }

    #[test]
    fn test_language_defaults_to_auto() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.language, "auto");

        let bulk: BulkAnalyzeRequest = serde_json::from_str(r#"{"texts": []}"#).unwrap();
        assert_eq!(bulk.language, "auto");
        assert!(bulk.texts.is_empty());
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language("auto"), "unknown");
        assert_eq!(resolve_language("en"), "en");
        assert_eq!(resolve_language("AUTO"), "AUTO");
        assert_eq!(resolve_language(""), "");
    }

    #[test]
    fn test_empty_text_fails_validation() {
        let err = AnalyzeRequest::new("").validate().unwrap_err();
        match err {
            Error::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].loc, vec!["body", "text"]);
                assert_eq!(fields[0].kind, "string_too_short");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert!(AnalyzeRequest::new(" ").validate().is_ok());
    }

    #[test]
    fn test_missing_text_is_rejected() {
        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"language": "en"}"#).is_err());
    }

    #[test]
    fn test_analysis_result_serialization() {
        let result = AnalysisResult {
            is_hate: false,
            category: Category::NonHate,
            severity: 0.08,
            language: "unknown".to_string(),
            confidence: 0.923,
            explanation: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "NON_HATE");
        assert_eq!(json["severity"], 0.08);
        assert_eq!(json["confidence"], 0.923);
        assert!(json["explanation"].is_null());
    }
}
