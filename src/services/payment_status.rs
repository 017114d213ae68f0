use crate::error::{AppError, AppResult};
use crate::logging::mask_hash;
use crate::payments::error::PaymentResult;
use crate::payments::provider::PaymentStatusProvider;
use crate::payments::types::{
    GeneratedPaymentHash, NormalizedPaymentStatus, TransactionHash, UpstreamPaymentRecord,
};
use crate::services::normalizer;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub const CHECK_PAYMENT_USAGE: &str = "/api/bakong/check_payment/?md5=your_hash";

/// Validate, look up, and normalize payment status through one upstream.
#[derive(Clone)]
pub struct PaymentStatusService {
    provider: Arc<dyn PaymentStatusProvider>,
}

impl PaymentStatusService {
    pub fn new(provider: Arc<dyn PaymentStatusProvider>) -> Self {
        Self { provider }
    }

    /// One upstream call for an already validated hash.
    pub async fn lookup(&self, hash: &TransactionHash) -> PaymentResult<UpstreamPaymentRecord> {
        let started = std::time::Instant::now();
        let result = self.provider.check_payment(hash).await;

        match &result {
            Ok(record) => info!(
                provider = %self.provider.name(),
                hash = %mask_hash(hash.as_str()),
                raw = record.is_raw(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Upstream lookup completed"
            ),
            Err(e) => warn!(
                provider = %self.provider.name(),
                hash = %mask_hash(hash.as_str()),
                error = %e,
                duration_ms = started.elapsed().as_millis() as u64,
                "Upstream lookup failed"
            ),
        }

        result
    }

    /// Gate the `md5` query value, then look it up and normalize the answer.
    ///
    /// Missing or malformed input is rejected before any outbound call.
    pub async fn check_payment_status(
        &self,
        md5: Option<&str>,
    ) -> AppResult<NormalizedPaymentStatus> {
        let candidate = match md5 {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AppError::missing_parameter("md5", CHECK_PAYMENT_USAGE)),
        };

        let hash = TransactionHash::parse(candidate).map_err(|_| {
            warn!(length = candidate.len(), "Rejected malformed md5 hash");
            AppError::invalid_hash(candidate)
        })?;

        let record = self.lookup(&hash).await.map_err(AppError::from)?;
        let normalized = normalizer::normalize(&record, &hash);

        info!(
            hash = %mask_hash(hash.as_str()),
            status = %normalized.status,
            "Payment status resolved"
        );

        Ok(normalized)
    }

    /// MD5 of a caller reference, usable later as the `md5` query value.
    pub fn generate_transaction_hash(reference: &str) -> GeneratedPaymentHash {
        let hash = TransactionHash::digest_of(reference);
        info!(hash = %mask_hash(hash.as_str()), "Generated payment hash");

        GeneratedPaymentHash {
            status: "success".to_string(),
            transaction_reference: reference.to_string(),
            payment_hash: hash.to_string(),
            generated_at: Utc::now(),
            message: "Use this hash to check payment status".to_string(),
        }
    }
}
