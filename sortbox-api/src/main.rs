//! SORTBOX API Server Entry Point
//!
//! Bootstraps configuration, connects to PostgreSQL (creating the schema if
//! needed), and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use sortbox_api::telemetry::{init_tracing, TelemetryConfig, METRICS};
use sortbox_api::{
    create_api_router, resolve_bind_addr, ApiConfig, ApiError, ApiResult, DbConfig, PgArrayStore,
};
use sortbox_storage::ArrayStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env();
    let store = PgArrayStore::connect(&db_config).await.map_err(|e| {
        tracing::error!(error = %e, host = %db_config.host, "Store unreachable at startup");
        e
    })?;
    tracing::info!(pool_size = store.pool_size(), "Connected to PostgreSQL");

    // Rows written while the service was down may have left gaps.
    let plan = store.reindex().await?;
    tracing::info!(total = plan.total, remapped = plan.remaps.len(), "Startup reindex done");
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.set_arrays_stored(plan.total);
    }

    let api_config = ApiConfig::from_env();
    let store: Arc<dyn ArrayStore> = Arc::new(store);
    let app: Router = create_api_router(store, &api_config, &telemetry_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting SORTBOX API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
