//! Search REST routes.
//!
//! Lookups against the catalogue-wide tag index. Exact tag matches come
//! first, then tags containing the query.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use hangar_core::SearchEntry;
use hangar_storage::SearchBucket;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Query string of the search route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/search?q=...
pub async fn search(
    State(catalog): State<Arc<Catalog>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchEntry>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::invalid_input("Search query 'q' must not be empty"));
    }
    let results = catalog.search().search(query);
    tracing::debug!(query, results = results.len(), "Search");
    Ok(Json(results))
}

/// GET /api/v1/search/index
pub async fn dump_index(State(catalog): State<Arc<Catalog>>) -> Json<Vec<SearchBucket>> {
    Json(catalog.search().buckets())
}

/// Create the search router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/index", get(dump_index))
}
