use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use copurchase_api::api::{create_router, AppState};
use copurchase_api::config::Config;
use copurchase_api::services::CsvFileSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("copurchase_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let source = Arc::new(CsvFileSource::new(
        &config.products_path,
        &config.purchases_path,
    ));
    let bind_address = config.bind_address();

    // Initialize application state
    let state = AppState::new(config, source);
    if let Err(e) = state.reload().await {
        tracing::warn!(error = %e, "Starting without a dataset; POST /reload once the data is fixed");
    }

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(address = %bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
