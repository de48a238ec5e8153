//! JSON body extractor with field-level validation errors

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use hateshield_core::{AnalyzeRequest, BulkAnalyzeRequest, FieldError, LocItem, Result};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_path_to_error::{Path, Segment};

/// Payloads with constraints beyond their serde shape
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for AnalyzeRequest {
    fn validate(&self) -> Result<()> {
        AnalyzeRequest::validate(self)
    }
}

impl Validate for BulkAnalyzeRequest {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Like [`axum::Json`], but shape and constraint failures become 422
/// responses listing the offending fields.
///
/// A body without a `Content-Type` header is parsed as JSON; any other
/// non-JSON content type is rejected with 415.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        if !accepts_json(req.headers()) {
            return Err(AppError::with_status(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`",
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::with_status(rejection.status(), rejection.body_text()))?;

        let value: T = parse_body(&bytes)?;
        value
            .validate()
            .map_err(|e| AppError::from_core(e, true))?;

        Ok(Self(value))
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, AppError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = body_path(err.path());
        AppError::validation(vec![field_error(path, err.into_inner())])
    })?;
    deserializer
        .end()
        .map_err(|err| AppError::validation(vec![field_error(Vec::new(), err)]))?;

    Ok(value)
}

/// Body path of a deserialization failure, e.g. `texts[1]` -> `["texts", 1]`
fn body_path(path: &Path) -> Vec<LocItem> {
    path.iter()
        .filter_map(|segment| match segment {
            Segment::Map { key } => Some(LocItem::Key(key.clone())),
            Segment::Seq { index } => Some(LocItem::Index(*index)),
            Segment::Enum { variant } => Some(LocItem::Key(variant.clone())),
            _ => None,
        })
        .collect()
}

fn field_error(mut path: Vec<LocItem>, err: serde_json::Error) -> FieldError {
    let msg = err.to_string();

    let kind = match err.classify() {
        Category::Data => match missing_field(&msg) {
            Some(field) => {
                path.push(LocItem::Key(field));
                "missing"
            }
            None => "type_error",
        },
        Category::Syntax | Category::Eof | Category::Io => {
            path.clear();
            "json_invalid"
        }
    };

    FieldError::at(path, msg).with_kind(kind)
}

/// Pull the field name out of serde messages like ``missing field `text` ``
fn missing_field(message: &str) -> Option<String> {
    let rest = message.split_once("missing field `")?.1;
    rest.split_once('`').map(|(field, _)| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn detail(err: AppError) -> serde_json::Value {
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        err.detail()[0].clone()
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            missing_field("missing field `text` at line 1 column 2"),
            Some("text".to_string())
        );
        assert_eq!(
            missing_field("invalid type: integer `5`, expected a string"),
            None
        );
    }

    #[test]
    fn test_wrong_type_reports_field_path() {
        let err = parse_body::<AnalyzeRequest>(br#"{"text": 42}"#).err().unwrap();
        let detail = detail(err);

        assert_eq!(detail["loc"], json!(["body", "text"]));
        assert_eq!(detail["type"], "type_error");
    }

    #[test]
    fn test_wrong_type_in_list_reports_index() {
        let err = parse_body::<BulkAnalyzeRequest>(br#"{"texts": ["a", 5]}"#)
            .err()
            .unwrap();

        assert_eq!(detail(err)["loc"], json!(["body", "texts", 1]));
    }

    #[test]
    fn test_missing_nested_field() {
        let err = parse_body::<BulkAnalyzeRequest>(br#"{"language": "en"}"#)
            .err()
            .unwrap();
        let detail = detail(err);

        assert_eq!(detail["loc"], json!(["body", "texts"]));
        assert_eq!(detail["type"], "missing");
    }

    #[test]
    fn test_syntax_error_has_body_loc() {
        let err = parse_body::<AnalyzeRequest>(br#"{"text": "#).err().unwrap();
        let detail = detail(err);

        assert_eq!(detail["loc"], json!(["body"]));
        assert_eq!(detail["type"], "json_invalid");
    }

    #[test]
    fn test_trailing_characters_are_invalid() {
        let err = parse_body::<AnalyzeRequest>(br#"{"text": "hi"} x"#).err().unwrap();
        assert_eq!(detail(err)["type"], "json_invalid");
    }

    #[test]
    fn test_content_type_check() {
        let mut headers = HeaderMap::new();
        assert!(accepts_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(accepts_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.api+json"),
        );
        assert!(accepts_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!accepts_json(&headers));
    }
}
