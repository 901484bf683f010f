//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::Catalog;

/// Application-wide state shared across all routes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Every entity adapter, the search index and the picture store.
    pub catalog: Arc<Catalog>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<Catalog>, catalog);
crate::impl_from_ref!(Instant, start_time);
