//! Rolodex API Server Entry Point
//!
//! Bootstraps configuration, opens the contact store, optionally starts the
//! expired-lock sweep, and serves the Axum router until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use rolodex_api::constants::DEFAULT_PORT;
use rolodex_api::jobs::{lock_sweep_task, LockSweepConfig};
use rolodex_api::telemetry::{init_tracing, TelemetryConfig};
use rolodex_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbConfig, PgContactStore,
    StoreBackend,
};
use rolodex_storage::{InMemoryContactStore, SharedStore};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let store = open_store(api_config.store).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = api_config.lock_sweep_interval.map(|interval| {
        tokio::spawn(lock_sweep_task(
            store.clone(),
            LockSweepConfig::every(interval),
            shutdown_rx,
        ))
    });

    let app = create_api_router(AppState::new(store.clone(), api_config));

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Rolodex API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweep {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Lock sweep task did not stop cleanly");
        }
    }

    store.close().await;
    tracing::info!("Rolodex API server stopped");
    Ok(())
}

async fn open_store(backend: StoreBackend) -> ApiResult<SharedStore> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory contact store; records are lost on exit");
            Ok(Arc::new(InMemoryContactStore::new()))
        }
        StoreBackend::Postgres => {
            let db_config = DbConfig::from_env();
            let store = PgContactStore::from_config(&db_config)?;
            store.ensure_schema().await?;
            tracing::info!(
                host = %db_config.host,
                dbname = %db_config.dbname,
                "Connected to PostgreSQL contact store"
            );
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("ROLODEX_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("ROLODEX_API_PORT").ok())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
