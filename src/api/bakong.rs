use crate::error::{AppError, AppErrorKind, AppResult, ValidationError};
use crate::health::HealthStatus;
use crate::middleware::error::get_request_id_from_headers;
use crate::payments::types::{GeneratedPaymentHash, NormalizedPaymentStatus};
use crate::services::payment_status::PaymentStatusService;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "Bakong Payment Gateway";

/// State for the gateway routes
#[derive(Clone)]
pub struct GatewayState {
    pub payment_service: Arc<PaymentStatusService>,
}

/// Query parameters for the status check
#[derive(Debug, Deserialize)]
pub struct CheckPaymentQuery {
    pub md5: Option<String>,
}

/// Static description of the gateway routes served at `/`
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub endpoints: EndpointIndex,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EndpointIndex {
    pub check_payment: String,
    pub create_payment: String,
    pub health: String,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/bakong/check_payment/", get(check_payment))
        .route("/api/bakong/check_payment", get(check_payment))
        .route("/api/bakong/create_payment", post(create_payment))
        .route("/api/bakong/health", get(health))
        .with_state(state)
}

pub async fn check_payment(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Query(params): Query<CheckPaymentQuery>,
) -> AppResult<Json<NormalizedPaymentStatus>> {
    let request_id = get_request_id_from_headers(&headers);

    state
        .payment_service
        .check_payment_status(params.md5.as_deref())
        .await
        .map(Json)
        .map_err(|e| attach_request_id(e, request_id))
}

/// Derive a checkable hash from `{"reference_id": "..."}`.
pub async fn create_payment(
    headers: HeaderMap,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GeneratedPaymentHash>)> {
    let request_id = get_request_id_from_headers(&headers);
    let reject = |reason: ValidationError| {
        attach_request_id(AppError::new(AppErrorKind::Validation(reason)), request_id.clone())
    };

    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "create_payment body rejected");
            return Err(reject(ValidationError::MissingReference));
        }
    };

    let reference = match body.as_object().and_then(|obj| obj.get("reference_id")) {
        None => return Err(reject(ValidationError::MissingReference)),
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        Some(_) => return Err(reject(ValidationError::InvalidReference)),
    };

    let generated = PaymentStatusService::generate_transaction_hash(&reference);
    info!(reference_len = reference.len(), "Payment hash created");

    Ok((StatusCode::CREATED, Json(generated)))
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::operational(SERVICE_NAME))
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: format!("{} API", SERVICE_NAME),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointIndex {
            check_payment: "GET /api/bakong/check_payment/?md5=HASH".to_string(),
            create_payment: "POST /api/bakong/create_payment".to_string(),
            health: "GET /api/bakong/health".to_string(),
        },
        timestamp: Utc::now(),
    })
}

fn attach_request_id(error: AppError, request_id: Option<String>) -> AppError {
    match request_id {
        Some(id) => error.with_request_id(id),
        None => error,
    }
}
