use crate::config::KhqrConfig;
use crate::logging::mask_hash;
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::PaymentStatusProvider;
use crate::payments::types::{ProviderName, TransactionHash, UpstreamPaymentRecord};
use crate::payments::utils::{body_excerpt, PaymentHttpClient};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{info, warn};

pub const KHQR_CHECK_PATH: &str = "/v1/check_transaction_by_md5";

/// Bakong error code for a missing, malformed, or expired developer token.
const TOKEN_REJECTED_CODE: i64 = 6;

/// Bakong open API transaction lookup by MD5, the call behind KHQR
/// payment checking. A `responseCode` of 0 means the transaction exists and
/// was paid; anything else reads as unpaid.
pub struct KhqrProvider {
    config: KhqrConfig,
    token: String,
    http: PaymentHttpClient,
}

impl KhqrProvider {
    pub fn new(config: KhqrConfig) -> PaymentResult<Self> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| PaymentError::ConfigurationError {
                message: "KHQR_TOKEN is required for the khqr upstream".to_string(),
            })?;
        let http = PaymentHttpClient::new("khqr", config.timeout(), "BakongPaymentGateway/1.0")?;
        Ok(Self {
            config,
            token,
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.config.base_url, KHQR_CHECK_PATH)
    }
}

#[async_trait]
impl PaymentStatusProvider for KhqrProvider {
    async fn check_payment(&self, hash: &TransactionHash) -> PaymentResult<UpstreamPaymentRecord> {
        info!(hash = %mask_hash(hash.as_str()), "Checking payment with Bakong");

        let payload = serde_json::json!({ "md5": hash.as_str() });
        let body = self
            .http
            .post_json_text(&self.endpoint(), Some(&self.token), &payload)
            .await?;

        let envelope: KhqrEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(
                    error = %e,
                    excerpt = %body_excerpt(&body, 100),
                    "Unexpected response from Bakong"
                );
                return Ok(UpstreamPaymentRecord::Raw(body));
            }
        };

        if envelope.error_code == Some(TOKEN_REJECTED_CODE) {
            warn!("Bakong rejected the developer token");
            return Err(PaymentError::RejectedError {
                provider: "khqr".to_string(),
                message: "Your Bakong developer token is either incorrect or expired"
                    .to_string(),
                provider_code: Some(TOKEN_REJECTED_CODE.to_string()),
            });
        }

        Ok(envelope.into_record())
    }

    fn name(&self) -> ProviderName {
        ProviderName::Khqr
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KhqrEnvelope {
    response_code: i64,
    #[serde(default)]
    response_message: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    data: Option<KhqrTransactionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KhqrTransactionData {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    from_account_id: Option<String>,
    #[serde(default)]
    to_account_id: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    amount: Option<JsonValue>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_date_ms: Option<i64>,
}

impl KhqrEnvelope {
    /// Flatten into the key names the normalizer already understands.
    fn into_record(self) -> UpstreamPaymentRecord {
        let paid = self.response_code == 0;
        let mut map = JsonMap::new();
        map.insert(
            "status".to_string(),
            JsonValue::from(if paid { "PAID" } else { "UNPAID" }),
        );

        if let Some(message) = self.response_message {
            map.insert("response_message".to_string(), JsonValue::from(message));
        }

        if let (true, Some(data)) = (paid, self.data) {
            let mut put = |key: &str, value: Option<JsonValue>| {
                if let Some(value) = value {
                    map.insert(key.to_string(), value);
                }
            };
            put("amount", data.amount);
            put("currency", data.currency.map(JsonValue::from));
            put("description", data.description.map(JsonValue::from));
            put("customer_id", data.from_account_id.map(JsonValue::from));
            put("merchant", data.to_account_id.map(JsonValue::from));
            put("hash", data.hash.map(JsonValue::from));
            put(
                "created_at",
                data.created_date_ms
                    .and_then(DateTime::from_timestamp_millis)
                    .map(|t| JsonValue::from(t.to_rfc3339())),
            );
        }

        UpstreamPaymentRecord::Structured(map)
    }
}
