//! Error response formatting middleware
//!
//! Provides the JSON error envelope shared by every gateway route and the
//! panic handler that turns handler bugs into a generic 500.

use crate::error::{AppError, ErrorCode};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: String,

    /// Machine-readable error code
    pub error_code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp of the error
    pub timestamp: String,

    /// Request ID for debugging and support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response from an AppError
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            status: "error".to_string(),
            error_code: error.error_code(),
            message: error.user_message(),
            timestamp: Utc::now().to_rfc3339(),
            request_id: error.request_id.clone(),
        }
    }

    /// Create a generic internal server error response
    pub fn internal_error(request_id: Option<String>) -> Self {
        Self {
            status: "error".to_string(),
            error_code: ErrorCode::InternalError,
            message: "Internal server error".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        }
    }
}

/// Implement IntoResponse for AppError to automatically convert errors
/// into HTTP responses with proper status codes and JSON formatting
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self.kind,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                retryable = self.is_retryable(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = ?self.kind,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let error_response = ErrorResponse::from_app_error(&self);
        (status_code, Json(error_response)).into_response()
    }
}

/// Helper to extract request ID from request headers
pub fn get_request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Panic handler for `CatchPanicLayer`: logs the payload and answers with the
/// generic INTERNAL_ERROR envelope.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal_error(None)),
    )
        .into_response()
}
