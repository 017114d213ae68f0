use crate::payments::error::PaymentResult;
use crate::payments::types::{ProviderName, TransactionHash, UpstreamPaymentRecord};
use async_trait::async_trait;

/// An upstream that can tell whether the payment behind a hash went through.
///
/// Implementations make exactly one outbound call per `check_payment` and
/// report every transport failure as a `PaymentError`; a successful exchange
/// with an unusable body comes back as `UpstreamPaymentRecord::Raw`.
#[async_trait]
pub trait PaymentStatusProvider: Send + Sync {
    async fn check_payment(&self, hash: &TransactionHash) -> PaymentResult<UpstreamPaymentRecord>;

    fn name(&self) -> ProviderName;
}
