//! Bakong payment-status gateway library
//!
//! Shared by the `bakong-gateway` and `khqr-checker` binaries: hash
//! validation, upstream clients, response normalization, and both HTTP
//! surfaces.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod server;
pub mod services;
