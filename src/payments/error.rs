use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Upstream timeout: provider={provider}, after {timeout_secs}s")]
    TimeoutError { provider: String, timeout_secs: u64 },

    #[error("Network error: provider={provider}, message={message}")]
    NetworkError { provider: String, message: String },

    #[error("Upstream returned HTTP {status}: provider={provider}")]
    UpstreamStatusError { provider: String, status: u16 },

    #[error("Upstream rejected request: provider={provider}, message={message}")]
    RejectedError {
        provider: String,
        message: String,
        provider_code: Option<String>,
    },

    #[error("Provider configuration error: {message}")]
    ConfigurationError { message: String },
}

impl PaymentError {
    /// Transport-level failures that mean "the upstream could not answer".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PaymentError::TimeoutError { .. }
                | PaymentError::NetworkError { .. }
                | PaymentError::UpstreamStatusError { .. }
        )
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::ValidationError { .. } => false,
            PaymentError::TimeoutError { .. } => true,
            PaymentError::NetworkError { .. } => true,
            PaymentError::UpstreamStatusError { status, .. } => *status >= 500 || *status == 429,
            PaymentError::RejectedError { .. } => false,
            PaymentError::ConfigurationError { .. } => false,
        }
    }

    pub(crate) fn from_transport(provider: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PaymentError::TimeoutError {
                provider: provider.to_string(),
                timeout_secs,
            }
        } else if err.is_connect() {
            PaymentError::NetworkError {
                provider: provider.to_string(),
                message: format!("connection error: {}", err),
            }
        } else {
            PaymentError::NetworkError {
                provider: provider.to_string(),
                message: format!("request failed: {}", err),
            }
        }
    }
}

impl From<PaymentError> for crate::error::AppError {
    fn from(err: PaymentError) -> Self {
        use crate::error::{AppError, AppErrorKind, ExternalError, InternalError, ValidationError};

        let kind = match err {
            PaymentError::ValidationError { message, field } => {
                AppErrorKind::Validation(ValidationError::InvalidHash {
                    value: field.unwrap_or_default(),
                    reason: message,
                })
            }
            PaymentError::ConfigurationError { message } => {
                AppErrorKind::Internal(InternalError::Configuration { message })
            }
            // Rejections (expired upstream token) surface as unavailability too.
            other => AppErrorKind::External(ExternalError::Unavailable {
                message: other.to_string(),
                is_retryable: other.is_retryable(),
            }),
        };

        AppError::new(kind)
    }
}
