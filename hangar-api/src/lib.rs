//! Hangar API - REST layer for the model-airplane catalogue
//!
//! Exposes every catalogue collection over Axum, resolves references
//! between entities, runs the picture-tagging workflow against the object
//! store and serves the tag search index.

pub mod catalog;
pub mod component;
pub mod components;
pub mod config;
pub mod error;
pub mod macros;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use catalog::Catalog;
pub use component::CatalogEntity;
pub use config::{ApiConfig, CatalogConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
