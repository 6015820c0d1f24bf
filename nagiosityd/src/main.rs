mod api;
mod config;
mod render;
mod status;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nagiosityd=info"))
        )
        .init();

    tracing::info!("Starting nagiosityd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/nagiosity/nagiosityd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);
    tracing::info!(
        path = %config.server.path,
        status_file = %config.nagios.status_file.display(),
        "Serving Nagios status"
    );

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
        .await
        .with_context(|| {
            format!("Failed to bind to {}:{}", config.server.host, config.server.port)
        })?;

    tracing::info!("API listening on {}", listener.local_addr()?);

    let app = api::routes::router(api::routes::AppState {
        config: Arc::new(config),
    });

    // Run server with graceful shutdown
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");
    cancel.cancel();

    if let Err(e) = server_handle.await {
        tracing::error!("Server task failed: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
