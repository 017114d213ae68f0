//! Maps whatever the upstream returned onto the fixed response schema.
//!
//! Upstreams disagree on key names and casing, so every output field is
//! resolved from an ordered list of candidate keys; the first key that is
//! present with a usable value wins.

use crate::payments::types::{
    NormalizedPaymentStatus, PaymentDetails, PaymentState, TransactionHash, UpstreamPaymentRecord,
    SERVICE_TAG,
};
use chrono::Utc;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const STATUS_KEYS: &[&str] = &["status", "Status", "STATE"];
pub const AMOUNT_KEYS: &[&str] = &["amount", "AMOUNT", "Value"];
pub const CURRENCY_KEYS: &[&str] = &["currency", "CURRENCY", "Currency"];
pub const MERCHANT_KEYS: &[&str] = &["merchant", "MERCHANT", "shop_id"];
pub const USER_KEYS: &[&str] = &["user", "USER", "customer_id"];
pub const TIME_KEYS: &[&str] = &["time", "TIME", "timestamp", "created_at"];
pub const DESCRIPTION_KEYS: &[&str] = &["description", "DESCRIPTION", "desc"];

pub const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Received unexpected response format from payment processor";

/// Normalize one upstream answer for `hash`. Never fails.
pub fn normalize(record: &UpstreamPaymentRecord, hash: &TransactionHash) -> NormalizedPaymentStatus {
    let checked_at = Utc::now();

    let map = match record {
        UpstreamPaymentRecord::Structured(map) => map,
        UpstreamPaymentRecord::Raw(_) => {
            return NormalizedPaymentStatus {
                status: PaymentState::Unknown,
                transaction_hash: hash.to_string(),
                message: UNEXPECTED_FORMAT_MESSAGE.to_string(),
                checked_at,
                service: SERVICE_TAG.to_string(),
                details: None,
            };
        }
    };

    let status = first_present(map, STATUS_KEYS)
        .and_then(scalar_text)
        .map(|raw| PaymentState::from_upstream(&raw))
        .unwrap_or(PaymentState::Unknown);

    NormalizedPaymentStatus {
        message: status.message().to_string(),
        status,
        transaction_hash: hash.to_string(),
        checked_at,
        service: SERVICE_TAG.to_string(),
        details: Some(extract_details(map)),
    }
}

/// Upstream status exactly as reported, for callers that relay it verbatim.
///
/// Returns `"unknown"` for the raw sentinel or when no status key is usable.
pub fn resolve_status_text(record: &UpstreamPaymentRecord) -> String {
    match record {
        UpstreamPaymentRecord::Structured(map) => first_present(map, STATUS_KEYS)
            .and_then(scalar_text)
            .unwrap_or_else(|| PaymentState::Unknown.as_str().to_string()),
        UpstreamPaymentRecord::Raw(_) => PaymentState::Unknown.as_str().to_string(),
    }
}

pub fn extract_details(map: &JsonMap<String, JsonValue>) -> PaymentDetails {
    let pick = |keys: &[&str]| first_non_null(map, keys).cloned();
    PaymentDetails {
        amount: pick(AMOUNT_KEYS),
        currency: pick(CURRENCY_KEYS),
        merchant: pick(MERCHANT_KEYS),
        user: pick(USER_KEYS),
        time: pick(TIME_KEYS),
        description: pick(DESCRIPTION_KEYS),
    }
}

/// First candidate key holding a non-null value. Empty strings count.
fn first_non_null<'a>(map: &'a JsonMap<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// First candidate key holding something other than null or an empty string.
fn first_present<'a>(map: &'a JsonMap<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| match value {
            JsonValue::Null => false,
            JsonValue::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hash() -> TransactionHash {
        TransactionHash::parse("5d41402abc4b2a76b9719d911017c592").unwrap()
    }

    fn record(value: JsonValue) -> UpstreamPaymentRecord {
        match value {
            JsonValue::Object(map) => UpstreamPaymentRecord::Structured(map),
            other => panic!("test record must be an object: {}", other),
        }
    }

    #[test]
    fn capitalized_status_key_is_recognized() {
        let result = normalize(&record(json!({"Status": "PAID"})), &hash());
        assert_eq!(result.status, PaymentState::Paid);
        assert_eq!(result.message, "Payment completed successfully");
        assert_eq!(result.service, "bakong_payment_gateway");
        assert_eq!(result.transaction_hash, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn candidate_order_decides_between_keys() {
        let result = normalize(
            &record(json!({"STATE": "failed", "status": "pending"})),
            &hash(),
        );
        assert_eq!(result.status, PaymentState::Pending);
    }

    #[test]
    fn null_and_empty_candidates_are_skipped() {
        let result = normalize(
            &record(json!({"status": null, "Status": "", "STATE": "EXPIRED"})),
            &hash(),
        );
        assert_eq!(result.status, PaymentState::Expired);
        assert_eq!(result.message, "Payment session expired");
    }

    #[test]
    fn missing_status_is_unknown() {
        let result = normalize(&record(json!({"amount": 5})), &hash());
        assert_eq!(result.status, PaymentState::Unknown);
        assert_eq!(result.message, "Payment status could not be determined");
        assert!(result.details.is_some());
    }

    #[test]
    fn unrecognized_status_passes_through_lowercased() {
        let result = normalize(&record(json!({"status": "ON_HOLD"})), &hash());
        assert_eq!(result.status.as_str(), "on_hold");
        assert_eq!(result.message, "Payment status unknown");
    }

    #[test]
    fn numeric_status_is_stringified() {
        let result = normalize(&record(json!({"status": 1})), &hash());
        assert_eq!(result.status.as_str(), "1");
    }

    #[test]
    fn raw_sentinel_has_no_details() {
        let result = normalize(
            &UpstreamPaymentRecord::Raw("<html>gateway error</html>".to_string()),
            &hash(),
        );
        assert_eq!(result.status, PaymentState::Unknown);
        assert_eq!(result.message, UNEXPECTED_FORMAT_MESSAGE);
        assert!(result.details.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn details_follow_candidate_tables() {
        let upstream = json!({
            "Value": "10.00",
            "AMOUNT": 12,
            "Currency": "KHR",
            "shop_id": "shop-9",
            "customer_id": "cust-1",
            "created_at": "2024-01-01T00:00:00Z",
            "timestamp": 1704067200,
            "desc": "topup",
            "unrelated": true
        });
        let details = extract_details(upstream.as_object().unwrap());

        assert_eq!(details.amount, Some(json!(12)));
        assert_eq!(details.currency, Some(json!("KHR")));
        assert_eq!(details.merchant, Some(json!("shop-9")));
        assert_eq!(details.user, Some(json!("cust-1")));
        assert_eq!(details.time, Some(json!(1704067200)));
        assert_eq!(details.description, Some(json!("topup")));
    }

    #[test]
    fn empty_detail_values_are_kept() {
        let upstream = json!({
            "amount": "",
            "AMOUNT": 5,
            "description": "  ",
            "desc": "x",
            "currency": null,
            "CURRENCY": "USD"
        });
        let details = extract_details(upstream.as_object().unwrap());

        assert_eq!(details.amount, Some(json!("")));
        assert_eq!(details.description, Some(json!("  ")));
        assert_eq!(details.currency, Some(json!("USD")));
    }

    #[test]
    fn status_text_is_relayed_verbatim() {
        assert_eq!(resolve_status_text(&record(json!({"status": "PAID"}))), "PAID");
        assert_eq!(resolve_status_text(&record(json!({"foo": "bar"}))), "unknown");
        assert_eq!(
            resolve_status_text(&UpstreamPaymentRecord::Raw("oops".to_string())),
            "unknown"
        );
    }
}
