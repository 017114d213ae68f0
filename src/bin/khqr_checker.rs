use bakong_gateway::api::khqr::{self, CheckerState};
use bakong_gateway::config::AppConfig;
use bakong_gateway::logging::init_tracing;
use bakong_gateway::payments::types::ProviderName;
use bakong_gateway::server;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env(ProviderName::Khqr)?;
    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %config.upstream.provider,
        "🚀 Starting KHQR payment checker"
    );

    config.validate().map_err(|e| {
        error!(error = %e, "❌ Invalid configuration");
        e
    })?;

    let payment_service = server::build_payment_service(&config)?;
    let app = server::with_middleware(khqr::router(CheckerState { payment_service }));

    info!(
        host = %config.server.host,
        port = config.server.port,
        "✅ Routes configured: GET /, GET /api/check_payment, GET /health"
    );

    server::serve(app, &config.server, khqr::SERVICE_NAME).await
}
