//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hateshield_core::{Error, FieldError};
use serde_json::{json, Value};

/// Error returned by handlers, rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    detail: Value,
}

impl AppError {
    /// 422 with field-level detail
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: json!(errors),
        }
    }

    /// 500 carrying `detail` as its message
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Value::String(detail.into()),
        }
    }

    /// Arbitrary status with a string detail
    pub fn with_status(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Value::String(detail.into()),
        }
    }

    /// Map a core error; `expose_details` controls whether the error text of
    /// server-side failures reaches the client.
    pub fn from_core(err: Error, expose_details: bool) -> Self {
        match err {
            Error::Validation(fields) => Self::validation(fields),
            other if expose_details => Self::internal(other.to_string()),
            _ => Self::internal("Internal server error"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_422() {
        let err = AppError::from_core(Error::validation("text", "empty"), false);

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail()[0]["loc"], json!(["body", "text"]));
    }

    #[test]
    fn test_inference_error_exposes_message() {
        let err = AppError::from_core(Error::classifier("weights missing"), true);

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), &json!("classifier error: weights missing"));
    }

    #[test]
    fn test_inference_error_hidden_when_disabled() {
        let err = AppError::from_core(Error::classifier("weights missing"), false);

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), &json!("Internal server error"));
    }
}
