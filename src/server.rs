//! Server bootstrap shared by both binaries
//!
//! Wires the configured upstream into a `PaymentStatusService`, wraps a router
//! in the common middleware stack, and serves it until Ctrl-C or SIGTERM.

use crate::config::{AppConfig, ServerConfig};
use crate::middleware::error::handle_panic;
use crate::middleware::logging::{request_logging_middleware, UuidRequestId};
use crate::payments::factory::PaymentProviderFactory;
use crate::services::payment_status::PaymentStatusService;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Build the payment service for the upstream selected in `config`.
pub fn build_payment_service(config: &AppConfig) -> anyhow::Result<Arc<PaymentStatusService>> {
    let factory = PaymentProviderFactory::from_app_config(config);
    let provider = factory.get_default_provider().map_err(|e| {
        error!(error = %e, "Failed to initialize payment upstream");
        e
    })?;

    info!(
        upstream = %provider.name(),
        available = ?factory.list_available_providers(),
        "Payment upstream initialized"
    );

    Ok(Arc::new(PaymentStatusService::new(provider)))
}

/// Request id, request logging, tracing, and panic recovery around `router`.
pub fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(axum::middleware::from_fn(request_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

/// Bind and serve `app` until a shutdown signal arrives.
pub async fn serve(app: Router, config: &ServerConfig, service_name: &str) -> anyhow::Result<()> {
    if let Some(tls) = &config.tls {
        warn!(
            cert = %tls.cert_path.display(),
            key = %tls.key_path.display(),
            "TLS paths configured; serving plain HTTP and expecting the fronting proxy to terminate TLS"
        );
    }

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| {
            error!("Failed to bind to address {}: {}", bind_address, e);
            e
        })?;
    let addr: SocketAddr = listener.local_addr()?;

    info!(address = %addr, service = service_name, "Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(service = service_name, "Server shutdown complete");
    Ok(())
}
