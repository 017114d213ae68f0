use crate::payments::error::PaymentError;
use crate::payments::validation::{is_valid_md5, md5_hex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::str::FromStr;

/// Tag reported in the `service` field of normalized responses
pub const SERVICE_TAG: &str = "bakong_payment_gateway";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    SourceApi,
    Khqr,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::SourceApi => "source_api",
            ProviderName::Khqr => "khqr",
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "source_api" | "source" => Ok(ProviderName::SourceApi),
            "khqr" | "bakong" => Ok(ProviderName::Khqr),
            _ => Err(PaymentError::ValidationError {
                message: format!("unsupported payment upstream: {}", value),
                field: Some("PAYMENT_UPSTREAM".to_string()),
            }),
        }
    }
}

/// A validated 32-character hexadecimal transaction hash.
///
/// The caller's casing is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionHash(String);

impl TransactionHash {
    pub fn parse(candidate: &str) -> Result<Self, PaymentError> {
        if is_valid_md5(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(PaymentError::ValidationError {
                message: "Invalid MD5 hash format. Must be 32-character hexadecimal string."
                    .to_string(),
                field: Some("md5".to_string()),
            })
        }
    }

    /// Hash derived from a caller-supplied reference string.
    pub fn digest_of(reference: &str) -> Self {
        Self(md5_hex(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransactionHash {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl std::fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whatever the upstream answered with on a successful HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPaymentRecord {
    /// A JSON object; key names and casing vary by upstream.
    Structured(JsonMap<String, JsonValue>),
    /// Anything that is not a JSON object, kept verbatim.
    Raw(String),
}

impl UpstreamPaymentRecord {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<JsonValue>(body) {
            Ok(JsonValue::Object(map)) => UpstreamPaymentRecord::Structured(map),
            _ => UpstreamPaymentRecord::Raw(body.to_string()),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, UpstreamPaymentRecord::Raw(_))
    }
}

impl From<JsonMap<String, JsonValue>> for UpstreamPaymentRecord {
    fn from(map: JsonMap<String, JsonValue>) -> Self {
        UpstreamPaymentRecord::Structured(map)
    }
}

/// Canonical payment status vocabulary.
///
/// Values outside the known vocabulary are kept, lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Success,
    Completed,
    Paid,
    Pending,
    Processing,
    Failed,
    Rejected,
    Expired,
    Cancelled,
    Unpaid,
    NotFound,
    Unknown,
    Unrecognized(String),
}

impl PaymentState {
    pub fn from_upstream(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "success" => PaymentState::Success,
            "completed" => PaymentState::Completed,
            "paid" => PaymentState::Paid,
            "pending" => PaymentState::Pending,
            "processing" => PaymentState::Processing,
            "failed" => PaymentState::Failed,
            "rejected" => PaymentState::Rejected,
            "expired" => PaymentState::Expired,
            "cancelled" => PaymentState::Cancelled,
            "unpaid" => PaymentState::Unpaid,
            "not_found" => PaymentState::NotFound,
            "unknown" | "" => PaymentState::Unknown,
            other => PaymentState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentState::Success => "success",
            PaymentState::Completed => "completed",
            PaymentState::Paid => "paid",
            PaymentState::Pending => "pending",
            PaymentState::Processing => "processing",
            PaymentState::Failed => "failed",
            PaymentState::Rejected => "rejected",
            PaymentState::Expired => "expired",
            PaymentState::Cancelled => "cancelled",
            PaymentState::Unpaid => "unpaid",
            PaymentState::NotFound => "not_found",
            PaymentState::Unknown => "unknown",
            PaymentState::Unrecognized(value) => value,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PaymentState::Success | PaymentState::Completed | PaymentState::Paid => {
                "Payment completed successfully"
            }
            PaymentState::Pending | PaymentState::Processing => "Payment is being processed",
            PaymentState::Failed => "Payment failed or was declined",
            PaymentState::Rejected => "Payment was rejected",
            PaymentState::Expired => "Payment session expired",
            PaymentState::Cancelled => "Payment was cancelled",
            PaymentState::Unpaid => "Payment has not been received yet",
            PaymentState::NotFound => "No payment found for this hash",
            PaymentState::Unknown => "Payment status could not be determined",
            PaymentState::Unrecognized(_) => "Payment status unknown",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PaymentState::from_upstream(&raw))
    }
}

/// Best-effort details copied from whichever upstream key was present
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPaymentStatus {
    pub status: PaymentState,
    pub transaction_hash: String,
    pub message: String,
    pub checked_at: DateTime<Utc>,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PaymentDetails>,
}

/// Response body of the reference-hash generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPaymentHash {
    pub status: String,
    pub transaction_reference: String,
    pub payment_hash: String,
    pub generated_at: DateTime<Utc>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_hash_preserves_case() {
        let hash = TransactionHash::parse("5D41402ABC4B2A76B9719D911017C592").unwrap();
        assert_eq!(hash.as_str(), "5D41402ABC4B2A76B9719D911017C592");
        assert!("not-a-hash".parse::<TransactionHash>().is_err());
    }

    #[test]
    fn transaction_hash_from_reference() {
        let hash = TransactionHash::digest_of("hello");
        assert_eq!(hash.to_string(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn record_from_json_object() {
        let record = UpstreamPaymentRecord::from_body(r#"{"status":"PAID"}"#);
        assert!(!record.is_raw());
    }

    #[test]
    fn record_from_non_object_is_raw() {
        assert!(UpstreamPaymentRecord::from_body("<html>oops</html>").is_raw());
        assert!(UpstreamPaymentRecord::from_body(r#""PAID""#).is_raw());
        assert!(UpstreamPaymentRecord::from_body("[1,2]").is_raw());
        assert!(UpstreamPaymentRecord::from_body("").is_raw());
    }

    #[test]
    fn state_vocabulary_is_case_insensitive() {
        assert_eq!(PaymentState::from_upstream("PAID"), PaymentState::Paid);
        assert_eq!(PaymentState::from_upstream("Pending"), PaymentState::Pending);
        assert_eq!(
            PaymentState::from_upstream("ON_HOLD"),
            PaymentState::Unrecognized("on_hold".to_string())
        );
        assert_eq!(PaymentState::from_upstream("ON_HOLD").as_str(), "on_hold");
    }

    #[test]
    fn state_messages() {
        assert_eq!(
            PaymentState::Completed.message(),
            "Payment completed successfully"
        );
        assert_eq!(
            PaymentState::Processing.message(),
            "Payment is being processed"
        );
        assert_eq!(
            PaymentState::Unknown.message(),
            "Payment status could not be determined"
        );
        assert_eq!(
            PaymentState::Unrecognized("x".to_string()).message(),
            "Payment status unknown"
        );
    }

    #[test]
    fn provider_name_parsing_works() {
        assert_eq!(
            ProviderName::from_str("KHQR").unwrap(),
            ProviderName::Khqr
        );
        assert_eq!(
            ProviderName::from_str("source_api").unwrap(),
            ProviderName::SourceApi
        );
        assert!(ProviderName::from_str("paypal").is_err());
    }

    #[test]
    fn details_skip_absent_fields() {
        let details = PaymentDetails {
            amount: Some(serde_json::json!(10.5)),
            ..Default::default()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json, serde_json::json!({"amount": 10.5}));
    }
}
