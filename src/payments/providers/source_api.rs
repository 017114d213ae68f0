use crate::config::SourceApiConfig;
use crate::logging::mask_hash;
use crate::payments::error::PaymentResult;
use crate::payments::provider::PaymentStatusProvider;
use crate::payments::types::{ProviderName, TransactionHash, UpstreamPaymentRecord};
use crate::payments::utils::{body_excerpt, PaymentHttpClient};
use async_trait::async_trait;
use tracing::{info, warn};

/// Remote "source" API answering `GET /check_payment?md5=<hash>` with a JSON
/// object whose key names are not stable.
pub struct SourceApiProvider {
    config: SourceApiConfig,
    http: PaymentHttpClient,
}

impl SourceApiProvider {
    pub fn new(config: SourceApiConfig) -> PaymentResult<Self> {
        let http = PaymentHttpClient::new("source_api", config.timeout(), &config.user_agent)?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, hash: &TransactionHash) -> String {
        format!("{}/check_payment?md5={}", self.config.base_url, hash)
    }
}

#[async_trait]
impl PaymentStatusProvider for SourceApiProvider {
    async fn check_payment(&self, hash: &TransactionHash) -> PaymentResult<UpstreamPaymentRecord> {
        info!(hash = %mask_hash(hash.as_str()), "Checking payment with source API");

        let body = self.http.get_text(&self.endpoint(hash)).await?;
        let record = UpstreamPaymentRecord::from_body(&body);

        if record.is_raw() {
            warn!(
                excerpt = %body_excerpt(&body, 100),
                "Non-JSON response from source API"
            );
        }

        Ok(record)
    }

    fn name(&self) -> ProviderName {
        ProviderName::SourceApi
    }
}
