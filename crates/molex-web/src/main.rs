//! Molex Web Server
//!
//! Run with: cargo run -p molex-web

use molex_common::Config;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Molex Web Server...");

    let config = Config::load()?;
    let addr: SocketAddr = match std::env::var("MOLEX_ADDR") {
        Ok(addr) => addr.parse()?,
        Err(_) => format!("{}:{}", config.server.host, config.server.port).parse()?,
    };

    // Create app state and kick off the first dataset + structure load
    let state = molex_web::state::AppState::from_config(config).await?;
    state.dashboard.mount();

    // Build router
    let app = molex_web::router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.dashboard.unmount().await;
    info!("Molex stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
