use anyhow::Context;
use sheetxml_server::telemetry::init_tracing;
use sheetxml_server::{router, AppState, ServiceConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_level, config.log_json)?;
    info!(config = ?config, "starting sheetxml-server");

    let state = AppState::from_config(&config).context("building conversion pipeline")?;
    if state.sessions.is_none() {
        warn!("no session secret configured; endpoints are unauthenticated");
    }

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "listening");

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
    }
}
