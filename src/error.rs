//! Error handling for the payment gateway
//!
//! This module provides a unified error system with proper HTTP status mapping,
//! user-friendly messages, and structured error codes for client handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes returned in the `error_code` field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "MISSING_PARAMETER")]
    MissingParameter,
    #[serde(rename = "INVALID_HASH")]
    InvalidHash,
    #[serde(rename = "MISSING_REFERENCE")]
    MissingReference,
    #[serde(rename = "INVALID_REFERENCE")]
    InvalidReference,
    #[serde(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// Caller supplied something unusable; never reaches the upstream
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Required query parameter absent or empty
    MissingParameter { name: String, usage: String },
    /// Not a 32-character hexadecimal hash
    InvalidHash { value: String, reason: String },
    /// JSON body absent, malformed, or without `reference_id`
    MissingReference,
    /// `reference_id` present but not a non-empty string
    InvalidReference,
}

/// Upstream payment-status source failures
#[derive(Debug, Clone)]
pub enum ExternalError {
    /// Timeout, connection failure, non-success status
    Unavailable { message: String, is_retryable: bool },
}

/// Faults inside the service itself
#[derive(Debug, Clone)]
pub enum InternalError {
    Configuration { message: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Validation(ValidationError),
    External(ExternalError),
    Internal(InternalError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
        }
    }

    pub fn missing_parameter(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::MissingParameter {
            name: name.into(),
            usage: usage.into(),
        }))
    }

    pub fn invalid_hash(value: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::InvalidHash {
            value: value.into(),
            reason: "must be a 32-character hexadecimal string".to_string(),
        }))
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Validation(_) => 400,
            AppErrorKind::External(ExternalError::Unavailable { .. }) => 503,
            AppErrorKind::Internal(_) => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingParameter { .. } => ErrorCode::MissingParameter,
                ValidationError::InvalidHash { .. } => ErrorCode::InvalidHash,
                ValidationError::MissingReference => ErrorCode::MissingReference,
                ValidationError::InvalidReference => ErrorCode::InvalidReference,
            },
            AppErrorKind::External(_) => ErrorCode::ServiceUnavailable,
            AppErrorKind::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingParameter { name, usage } => {
                    format!(
                        "{} hash parameter is required. Usage: {}",
                        name.to_uppercase(),
                        usage
                    )
                }
                ValidationError::InvalidHash { .. } => {
                    "Invalid MD5 hash format. Must be 32-character hexadecimal string.".to_string()
                }
                ValidationError::MissingReference => {
                    "reference_id is required in JSON body".to_string()
                }
                ValidationError::InvalidReference => "Valid data string is required".to_string(),
            },
            AppErrorKind::External(_) => {
                "Payment service is temporarily unavailable. Please try again later.".to_string()
            }
            AppErrorKind::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Validation(_) => false,
            AppErrorKind::External(ExternalError::Unavailable { is_retryable, .. }) => {
                *is_retryable
            }
            AppErrorKind::Internal(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for AppError {}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
