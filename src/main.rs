use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::settings::AppConfig;
use crate::state::AppState;

mod app;
mod common;
mod config;
mod docs;
mod modules;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::new().context("Invalid configuration")?;

    // RUST_LOG wins; otherwise the debug flag picks the level
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting server...");

    tokio::fs::create_dir_all(&config.upload_folder)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_folder.display()))?;

    info!(
        "Default quality {}, allowed extensions {:?}",
        config.compression_quality, config.allowed_extensions
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let app = app::create_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
