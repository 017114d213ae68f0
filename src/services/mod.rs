//! Services module for business logic

pub mod normalizer;
pub mod payment_status;

pub use payment_status::PaymentStatusService;
