//! Health check payloads
//! Both services report a static operational status; neither probes the upstream.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Overall health state
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Operational,
}

impl HealthStatus {
    pub fn operational(service: impl Into<String>) -> Self {
        Self {
            status: HealthState::Operational,
            service: service.into(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
