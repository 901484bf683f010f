//! Generic CRUD route handlers for catalogue collections.
//!
//! Every collection shares the same surface, generated from its
//! `CatalogEntity` implementation. Collections with extra routes add them
//! on top of [`crud_routes`].
//!
//! # Usage
//!
//! ```ignore
//! pub fn create_router() -> Router<AppState> {
//!     crud_routes::<Model>()
//!         .route("/picture", post(add_picture))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use hangar_storage::BatchReport;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    component::CatalogEntity,
    error::{ApiError, ApiResult},
    services,
    state::AppState,
};

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Result of a cache reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheResetResponse {
    pub collection: String,
    pub cached: usize,
}

// ============================================================================
// GENERIC HANDLER HELPERS
// ============================================================================

/// Every canonical record of the collection.
pub async fn list_handler<C: CatalogEntity>(catalog: &Catalog) -> ApiResult<Json<Vec<C>>> {
    Ok(Json(C::list(catalog).await?))
}

/// One record, or 404.
pub async fn get_handler<C: CatalogEntity>(catalog: &Catalog, code: &str) -> ApiResult<Json<C>> {
    let entity = C::get_by_code(catalog, code)
        .await?
        .ok_or_else(|| ApiError::entity_not_found(C::COLLECTION, code))?;
    Ok(Json(entity))
}

/// Upsert, echoing the stored record with references resolved.
pub async fn put_handler<C: CatalogEntity>(catalog: &Catalog, entity: C) -> ApiResult<Json<C>> {
    Ok(Json(C::put(catalog, entity).await?))
}

/// Delete, successful whether or not the record existed.
pub async fn delete_handler<C: CatalogEntity>(
    catalog: &Catalog,
    code: &str,
) -> ApiResult<Json<MessageResponse>> {
    C::delete(catalog, code).await?;
    Ok(Json(MessageResponse {
        message: format!("Object with code {} deleted", code),
    }))
}

// ============================================================================
// GENERIC ROUTE FACTORY
// ============================================================================

/// Create a router with the standard routes for a collection.
///
/// # Routes Created
///
/// - `GET /` - List records
/// - `PUT /` - Create or replace a record
/// - `GET /:code` - Get record by code
/// - `DELETE /:code` - Delete record
/// - `POST /import` - Bulk load a JSON array
/// - `POST /cache/reset` - Reload the collection's cache
pub fn crud_routes<C: CatalogEntity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_route::<C>).put(put_route::<C>))
        .route("/import", post(import_route::<C>))
        .route("/cache/reset", post(reset_cache_route::<C>))
        .route("/:code", get(get_route::<C>).delete(delete_route::<C>))
}

async fn list_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
) -> ApiResult<Json<Vec<C>>> {
    list_handler::<C>(&catalog).await
}

async fn get_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
    Path(code): Path<String>,
) -> ApiResult<Json<C>> {
    get_handler::<C>(&catalog, &code).await
}

async fn put_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
    Json(entity): Json<C>,
) -> ApiResult<Json<C>> {
    put_handler::<C>(&catalog, entity).await
}

async fn delete_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
    Path(code): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    delete_handler::<C>(&catalog, &code).await
}

async fn import_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
    Json(records): Json<Vec<C>>,
) -> ApiResult<Json<BatchReport>> {
    Ok(Json(services::import_records::<C>(&catalog, records).await?))
}

async fn reset_cache_route<C: CatalogEntity>(
    State(catalog): State<Arc<Catalog>>,
) -> ApiResult<Json<CacheResetResponse>> {
    let adapter = C::adapter(&catalog);
    adapter.reset_cache().await?;
    Ok(Json(CacheResetResponse {
        collection: C::COLLECTION.to_string(),
        cached: adapter.cached_len()?,
    }))
}
