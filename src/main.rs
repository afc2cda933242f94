// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon Tracker API Server
//!
//! Serves the activity ledger to the mobile front end and persists it to a
//! directory of JSON files.

use anyhow::Context;
use carbon_tracker::{config::Config, db::FileStore, services::Ledger, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(port = config.port, "Starting Carbon Tracker API");

    // Open local storage and restore the ledger
    let store = FileStore::open(&config.data_dir)
        .await
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
    tracing::info!(path = %config.data_dir.display(), "Loading ledger");
    let ledger = Arc::new(Ledger::load(Arc::new(store)).await);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), ledger.clone()));

    // Build router
    let app = carbon_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let the last queued write land before exiting
    let sync = ledger.settled().await;
    tracing::info!(
        status = ?sync.status,
        revision = sync.revision,
        "Shut down"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("carbon_tracker=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
