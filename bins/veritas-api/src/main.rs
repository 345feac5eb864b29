mod handlers;
mod routes;

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use veritas_harness::{Harness, HarnessSettings, RuntimeConfigManager};

pub struct AppState {
    pub harness: Harness,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Veritas API booting...");

    let settings = HarnessSettings::from_env()?;
    let runtimes = RuntimeConfigManager::load_or_builtin().map_err(|e| {
        error!("Failed to load runtime configurations: {:#}", e);
        error!("Check config/runtimes.json or HARNESS_RUNTIME_CONFIG");
        e
    })?;
    info!("Loaded runtimes: {:?}", runtimes.list_runtimes());

    let state = Arc::new(AppState {
        harness: Harness::new(settings, &runtimes)?,
    });

    // Build router
    let app = Router::new().merge(routes::routes()).with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
