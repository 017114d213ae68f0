//! The simple checker: relays the upstream status string as-is.
//!
//! Errors use a flat `{"error": "..."}` body rather than the gateway envelope.

use crate::health::HealthStatus;
use crate::logging::mask_hash;
use crate::payments::error::PaymentError;
use crate::payments::types::TransactionHash;
use crate::services::normalizer::resolve_status_text;
use crate::services::payment_status::PaymentStatusService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "KHQR Payment Checker";

const DOCS_PAGE: &str = include_str!("../../assets/khqr_docs.html");

#[derive(Clone)]
pub struct CheckerState {
    pub payment_service: Arc<PaymentStatusService>,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub md5: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub md5: String,
    pub status: String,
}

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Missing md5 parameter")]
    MissingMd5,

    #[error("Invalid md5 format")]
    InvalidMd5,

    #[error("{0}")]
    Rejected(String),

    #[error("Internal server error")]
    Internal,
}

impl From<PaymentError> for CheckerError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::RejectedError { message, .. } => CheckerError::Rejected(message),
            PaymentError::ValidationError { .. } => CheckerError::InvalidMd5,
            other => {
                error!(error = %other, "Payment check failed");
                CheckerError::Internal
            }
        }
    }
}

impl IntoResponse for CheckerError {
    fn into_response(self) -> Response {
        let status = match self {
            CheckerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: CheckerState) -> Router {
    Router::new()
        .route("/", get(docs))
        .route("/api/check_payment", get(check_payment))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn check_payment(
    State(state): State<CheckerState>,
    Query(params): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, CheckerError> {
    let md5 = params
        .md5
        .filter(|value| !value.is_empty())
        .ok_or(CheckerError::MissingMd5)?;

    let hash = TransactionHash::parse(&md5).map_err(|_| {
        warn!(length = md5.len(), "Rejected malformed md5");
        CheckerError::InvalidMd5
    })?;

    let record = state.payment_service.lookup(&hash).await?;
    let status = resolve_status_text(&record);

    info!(hash = %mask_hash(hash.as_str()), status = %status, "Payment checked");

    Ok(Json(CheckResponse { md5, status }))
}

pub async fn docs() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::operational(SERVICE_NAME))
}
