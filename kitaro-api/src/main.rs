//! MEGAKITARO Registry API Server Entry Point
//!
//! Bootstraps logging and metrics, opens the configured store and serves
//! the Axum router until Ctrl-C.

use axum::Router;
use kitaro_api::telemetry::{init_tracing, metrics::init_metrics, TelemetryConfig};
use kitaro_api::{create_api_router, resolve_bind_addr, ApiConfig, ApiError, ApiResult, AppState, DbConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;
    if telemetry_config.metrics_enabled {
        init_metrics();
    }

    let api_config = ApiConfig::from_env()?;
    let db_config = DbConfig::from_env();
    let state = AppState::from_config(&api_config, &db_config).await?;

    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting MEGAKITARO registry API");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
