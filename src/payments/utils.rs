use crate::payments::error::{PaymentError, PaymentResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{error, info};

/// Single-shot HTTP client shared by the upstream providers.
///
/// Every call is bounded by `timeout`; only HTTP 200 counts as success.
#[derive(Clone)]
pub struct PaymentHttpClient {
    client: Client,
    provider: &'static str,
    timeout: Duration,
}

impl PaymentHttpClient {
    pub fn new(provider: &'static str, timeout: Duration, user_agent: &str) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| PaymentError::ConfigurationError {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            provider,
            timeout,
        })
    }

    /// GET `url` and return the response body.
    pub async fn get_text(&self, url: &str) -> PaymentResult<String> {
        self.send(url, self.client.get(url)).await
    }

    /// POST `body` as JSON to `url` and return the response body.
    pub async fn post_json_text(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &JsonValue,
    ) -> PaymentResult<String> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        self.send(url, request).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> PaymentResult<String> {
        let timeout_secs = self.timeout.as_secs();
        info!(provider = self.provider, url = %redact_query(url), "Calling upstream");

        let response = request.send().await.map_err(|e| {
            let err = PaymentError::from_transport(self.provider, timeout_secs, e);
            error!(provider = self.provider, error = %err, "Upstream request failed");
            err
        })?;

        let status = response.status();
        info!(provider = self.provider, status = status.as_u16(), "Upstream responded");

        if status != StatusCode::OK {
            error!(
                provider = self.provider,
                status = status.as_u16(),
                "Upstream returned error status"
            );
            return Err(PaymentError::UpstreamStatusError {
                provider: self.provider.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| PaymentError::from_transport(self.provider, timeout_secs, e))
    }
}

/// First `max_chars` characters of an upstream body, for log lines.
pub fn body_excerpt(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
