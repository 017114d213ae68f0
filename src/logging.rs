//! Tracing subscriber setup and log-safe formatting helpers

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `LOG_LEVEL` when both are present. Calling this twice
/// is harmless; the second install attempt is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Plain => registry
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Shorten a transaction hash for logs: first 8 and last 4 characters.
pub fn mask_hash(hash: &str) -> String {
    if hash.len() <= 12 || !hash.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &hash[..8], &hash[hash.len() - 4..])
}
