//! Hangar API Server Entry Point
//!
//! Loads configuration, opens the catalogue (performing the initial cache
//! load), and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use hangar_api::telemetry::{init_tracing, TelemetryConfig};
use hangar_api::{create_api_router, ApiConfig, ApiError, ApiResult, Catalog, CatalogConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracing(&telemetry_config)?;

    let catalog_config = CatalogConfig::from_env()?;
    let catalog = Arc::new(Catalog::in_memory(catalog_config).await?);

    let api_config = ApiConfig::from_env()?;
    let app: Router = create_api_router(catalog, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Hangar API server");

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
