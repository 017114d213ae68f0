use bakong_gateway::api::bakong::{self, GatewayState};
use bakong_gateway::config::AppConfig;
use bakong_gateway::logging::init_tracing;
use bakong_gateway::payments::types::ProviderName;
use bakong_gateway::server;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env(ProviderName::SourceApi)?;
    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %config.upstream.provider,
        "🚀 Starting Bakong payment gateway"
    );

    config.validate().map_err(|e| {
        error!(error = %e, "❌ Invalid configuration");
        e
    })?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration loaded"
    );

    let payment_service = server::build_payment_service(&config)?;
    let app = server::with_middleware(bakong::router(GatewayState { payment_service }));

    info!("✅ Routes configured");
    println!();
    println!("  Bakong Payment Gateway v{}", env!("CARGO_PKG_VERSION"));
    println!("  GET  /                                   service info");
    println!("  GET  /api/bakong/check_payment/?md5=HASH  check payment status");
    println!("  POST /api/bakong/create_payment          derive hash from reference_id");
    println!("  GET  /api/bakong/health                  health check");
    println!();

    server::serve(app, &config.server, bakong::SERVICE_NAME).await
}
