//! HateShield Core
//!
//! Types and error handling shared across HateShield components.
//!
//! This crate provides:
//! - The request and response payloads of the analysis API
//! - The normalized [`AnalysisResult`] produced for every analyzed text
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, FieldError, LocItem, Result};
pub use types::{
    AnalysisResult, AnalyzeRequest, AnalyzeResponse, BulkAnalyzeRequest, BulkAnalyzeResponse,
    BulkItemResult, Category, AUTO_LANGUAGE, UNKNOWN_LANGUAGE,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{AnalysisResult, Category};
}
