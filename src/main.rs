//! dronebox-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and the
//! controller reachability poller.

use std::sync::Arc;

use anyhow::Context;

use dronebox_gateway::activity::TracingActivityLog;
use dronebox_gateway::api;
use dronebox_gateway::app_state::AppState;
use dronebox_gateway::config::GatewayConfig;
use dronebox_gateway::logging;
use dronebox_gateway::orders::InMemoryOrderStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;
    logging::init(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        device = %format!("{}:{}", config.device_host, config.device_port),
        "starting dronebox-gateway"
    );

    // Build application state
    let app_state = AppState::new(
        &config,
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(TracingActivityLog),
    )?;

    let poller = config
        .poller_enabled
        .then(|| app_state.reachability_poller(&config).spawn());

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(poller) = poller {
        poller.stop().await;
    }
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
