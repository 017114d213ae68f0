//! Integration tests for the KHQR checker routes, backed by a mock Bakong API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bakong_gateway::api::khqr::{router, CheckerState};
use bakong_gateway::config::KhqrConfig;
use bakong_gateway::payments::providers::{KhqrProvider, KHQR_CHECK_PATH};
use bakong_gateway::server::with_middleware;
use bakong_gateway::services::payment_status::PaymentStatusService;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const HASH: &str = "5d41402abc4b2a76b9719d911017c592";

fn checker_app(base_url: String) -> Router {
    let provider = KhqrProvider::new(KhqrConfig {
        base_url,
        token: Some("test-token".to_string()),
        timeout_secs: 2,
    })
    .expect("provider should build");
    let payment_service = Arc::new(PaymentStatusService::new(Arc::new(provider)));
    with_middleware(router(CheckerState { payment_service }))
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_paid_transaction_status_is_relayed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(KHQR_CHECK_PATH)
                .header("authorization", "Bearer test-token")
                .json_body(json!({ "md5": HASH }));
            then.status(200).json_body(json!({
                "responseCode": 0,
                "responseMessage": "Getting transaction successfully.",
                "errorCode": null,
                "data": { "hash": "abc", "amount": 2, "currency": "KHR" }
            }));
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        &format!("/api/check_payment?md5={}", HASH),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "md5": HASH, "status": "PAID" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_transaction_is_unpaid() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(200).json_body(json!({
                "responseCode": 1,
                "responseMessage": "Transaction could not be found.",
                "errorCode": 1,
                "data": null
            }));
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        &format!("/api/check_payment?md5={}", HASH),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UNPAID");
}

#[tokio::test]
async fn test_missing_md5() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(200);
        })
        .await;

    let (status, body) = call(checker_app(server.base_url()), "/api/check_payment").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing md5 parameter" }));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_invalid_md5() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(200);
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        "/api/check_payment?md5=12345",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid md5 format" }));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_padded_md5_is_invalid() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(200).json_body(json!({ "responseCode": 0, "data": {} }));
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        &format!("/api/check_payment?md5=%20{}%20", HASH),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid md5 format" }));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_rejected_token_is_bad_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(200).json_body(json!({
                "responseCode": 1,
                "responseMessage": "Unauthorized",
                "errorCode": 6,
                "data": null
            }));
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        &format!("/api/check_payment?md5={}", HASH),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Your Bakong developer token is either incorrect or expired"
    );
}

#[tokio::test]
async fn test_upstream_outage_is_internal_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(KHQR_CHECK_PATH);
            then.status(503);
        })
        .await;

    let (status, body) = call(
        checker_app(server.base_url()),
        &format!("/api/check_payment?md5={}", HASH),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_docs_page_is_html() {
    let app = checker_app("http://127.0.0.1:1".to_string());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_health_is_operational() {
    let (status, body) = call(checker_app("http://127.0.0.1:1".to_string()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["service"], "KHQR Payment Checker");
}
