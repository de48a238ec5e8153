//! Error types for HateShield

use serde::Serialize;
use std::fmt;

/// Result type alias using HateShield's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for HateShield operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request payload failed validation
    #[error("validation error: {}", describe(.0))]
    Validation(Vec<FieldError>),

    /// Model loading or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new single-field validation error
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, msg)])
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short, stable name of the error kind (used for metric labels)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Classifier(_) => "classifier",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

/// One step of a field path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for LocItem {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for LocItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl PartialEq<&str> for LocItem {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::Key(key) if key == other)
    }
}

impl fmt::Display for LocItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A single field-level validation failure.
///
/// `loc` is the path to the offending field, starting with the request part
/// (always `"body"` for JSON payloads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<LocItem>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Validation failure on a body field
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::at(vec![LocItem::Key(field.into())], msg)
    }

    /// Validation failure at a nested body path such as `texts[1]`
    pub fn at(path: Vec<LocItem>, msg: impl Into<String>) -> Self {
        let mut loc = Vec::with_capacity(path.len() + 1);
        loc.push(LocItem::from("body"));
        loc.extend(path);

        Self {
            loc,
            msg: msg.into(),
            kind: "value_error".to_string(),
        }
    }

    /// Override the error type tag
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| {
            let loc = e
                .loc
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            format!("{}: {}", loc, e.msg)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
