//! REST API Routes Module
//!
//! Includes:
//! - Collection routes for every catalogue entity under /api/v1
//! - Model picture workflow under /api/v1/model/picture
//! - Tag search under /api/v1/search
//! - Health check endpoints under /health
//! - CORS support for browser-based clients

pub mod generic;
pub mod health;
pub mod model;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use hangar_core::{Airline, Airplane, AirplaneMake, Country, ModelMake};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::component::CatalogEntity;
use crate::config::ApiConfig;
use crate::state::AppState;

pub use generic::crud_routes;
pub use health::create_router as health_router;
pub use model::create_router as model_router;
pub use search::create_router as search_router;

// ============================================================================
// ROUTER
// ============================================================================

fn collection_path<C: CatalogEntity>() -> String {
    format!("/{}", C::COLLECTION)
}

/// Build the `/api/v1` routes.
fn build_entity_routes() -> Router<AppState> {
    Router::new()
        .nest(&collection_path::<Airline>(), crud_routes::<Airline>())
        .nest(&collection_path::<Airplane>(), crud_routes::<Airplane>())
        .nest(&collection_path::<AirplaneMake>(), crud_routes::<AirplaneMake>())
        .nest(&collection_path::<ModelMake>(), crud_routes::<ModelMake>())
        .nest(&collection_path::<Country>(), crud_routes::<Country>())
        .nest("/model", model_router())
        .nest("/search", search_router())
}

/// Create the complete API router.
///
/// - Collection routes under /api/v1/{collection}
/// - Search under /api/v1/search
/// - Health checks at /health/*
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. Trace - one span per request
pub fn create_api_router(catalog: Arc<Catalog>, api_config: &ApiConfig) -> Router {
    let state = AppState::new(catalog);

    Router::new()
        .nest("/api/v1", build_entity_routes())
        .nest("/health", health_router())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
        .with_state(state)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
