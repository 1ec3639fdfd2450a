use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use tracing::{error, warn};
use utoipa::ToSchema;

use super::app_error::{AppError, ApplicationError, Details};
use super::codes::ErrorKind;
use crate::metrics::APP_ERRORS_TOTAL;

/// Structured error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error category for programmatic handling
    #[schema(example = "NOT_FOUND")]
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional context, empty when there is none
    #[schema(value_type = Object)]
    pub details: Details,
}

impl ErrorResponse {
    /// Build the body for any application error
    pub fn from_error(err: &dyn ApplicationError) -> Self {
        Self {
            error: err.error_type().to_string(),
            message: err.message().to_string(),
            details: err.details().clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.kind().is_server_error() {
            error!(
                error_type = %self.error_type(),
                status = %status.as_u16(),
                error_message = %self.message(),
                cause = %source_chain(&self),
                "Request failed"
            );
        } else {
            warn!(
                error_type = %self.error_type(),
                status = %status.as_u16(),
                error_message = %self.message(),
                "Request rejected"
            );
        }

        APP_ERRORS_TOTAL
            .with_label_values(&[self.error_type()])
            .inc();

        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}

/// Malformed or mistyped JSON bodies are validation failures
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::new(ErrorKind::Validation)
            .with_detail("reason", rejection.body_text())
            .with_source(rejection)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::new(ErrorKind::Validation)
            .with_detail("reason", rejection.body_text())
            .with_source(rejection)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::new(ErrorKind::Validation)
            .with_detail("reason", rejection.body_text())
            .with_source(rejection)
    }
}

fn source_chain(err: &dyn StdError) -> String {
    let mut parts = Vec::new();
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_response_serialization() {
        let err = AppError::not_found("User 42 not found");
        let body = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();
        assert_eq!(
            body,
            json!({
                "error": "NOT_FOUND",
                "message": "User 42 not found",
                "details": {}
            })
        );
    }

    #[test]
    fn test_error_with_details() {
        let err = AppError::new(ErrorKind::Validation)
            .with_details([("field", "email"), ("reason", "invalid format")]);
        let body = ErrorResponse::from_error(&err);
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(body.message, "Validation failed");
        assert_eq!(body.details["field"], "email");
    }

    #[test]
    fn test_source_is_not_rendered() {
        let err = AppError::internal_from(std::io::Error::other("password=hunter2"));
        let rendered = serde_json::to_string(&ErrorResponse::from_error(&err)).unwrap();
        assert!(!rendered.contains("hunter2"));
        assert_eq!(source_chain(&err), "password=hunter2");
    }

    // ========== HTTP STATUS CODE TESTS ==========

    #[test]
    fn test_into_response_status_per_category() {
        let cases = [
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::Validation, StatusCode::UNPROCESSABLE_ENTITY),
            (ErrorKind::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ErrorKind::Conflict, StatusCode::CONFLICT),
            (ErrorKind::Agent, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::Configuration, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::ExternalService, StatusCode::BAD_GATEWAY),
            (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (kind, status) in cases {
            let response = AppError::new(kind).into_response();
            assert_eq!(response.status(), status, "{kind}");
        }
    }

    #[tokio::test]
    async fn test_into_response_body_bad_gateway() {
        let response = AppError::external_service("Upstream API timed out").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "EXTERNAL_SERVICE_ERROR");
        assert_eq!(body["message"], "Upstream API timed out");
        assert_eq!(body["details"], json!({}));
    }

    #[test]
    fn test_into_response_counts_errors() {
        let before = APP_ERRORS_TOTAL.with_label_values(&["CONFLICT"]).get();
        let _ = AppError::conflict("taken").into_response();
        let after = APP_ERRORS_TOTAL.with_label_values(&["CONFLICT"]).get();
        assert!(after > before);
    }
}
