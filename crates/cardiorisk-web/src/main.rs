//! cardiorisk web server
//!
//! Run with: cargo run -p cardiorisk-web

use std::net::SocketAddr;

use anyhow::Context;
use cardiorisk_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cardiorisk=debug,info")),
        )
        .init();

    let config = Config::load().context("loading configuration")?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.server.host, config.server.port))?;

    info!(fhir = %config.smart.base_url(), "Starting cardiorisk web server...");
    let state = cardiorisk_web::state::AppState::new(config)?;
    let app = cardiorisk_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
