//! Upstream payment-status lookups: hash validation, provider clients, and
//! the raw record types they hand back.

pub mod error;
pub mod factory;
pub mod provider;
pub mod providers;
pub mod types;
pub mod utils;
pub mod validation;

pub use error::{PaymentError, PaymentResult};
pub use factory::PaymentProviderFactory;
pub use provider::PaymentStatusProvider;
pub use types::{
    NormalizedPaymentStatus, PaymentDetails, PaymentState, ProviderName, TransactionHash,
    UpstreamPaymentRecord,
};
