//! Model REST routes.
//!
//! Standard collection routes plus the picture workflow:
//! - `POST /picture` multipart upload (`picture` file, `modelList` codes)
//! - `GET /picture/:picture_id/list-models`
//! - `PUT /picture/:picture_id/tag` and `/untag` with `{"codes": [...]}`
//! - `DELETE /picture/:picture_id`

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use hangar_core::Model;
use serde::{Deserialize, Serialize};

use super::generic::crud_routes;
use crate::{
    catalog::Catalog,
    error::{ApiError, ApiResult},
    services,
    state::AppState,
};

/// Largest accepted picture upload.
pub const PICTURE_UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

/// Multipart field carrying the picture bytes.
const PICTURE_FIELD: &str = "picture";
/// Multipart field carrying the comma-separated model codes.
const MODEL_LIST_FIELD: &str = "modelList";

/// Body of the tag and untag routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureCodesRequest {
    #[serde(default)]
    pub codes: Vec<String>,
}

/// Split a `modelList` field value into codes.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/model/picture
pub async fn add_picture(
    State(catalog): State<Arc<Catalog>>,
    mut multipart: Multipart,
) -> ApiResult<Json<Vec<Model>>> {
    let mut picture: Option<Vec<u8>> = None;
    let mut codes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_input(format!("Invalid multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            PICTURE_FIELD => {
                let data = field.bytes().await.map_err(|e| {
                    ApiError::invalid_input(format!("Failed to read picture: {}", e))
                })?;
                picture = Some(data.to_vec());
            }
            MODEL_LIST_FIELD => {
                let value = field.text().await.map_err(|e| {
                    ApiError::invalid_input(format!("Invalid {} field: {}", MODEL_LIST_FIELD, e))
                })?;
                codes.extend(parse_model_list(&value));
            }
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown multipart field");
            }
        }
    }

    let picture = picture.ok_or_else(|| ApiError::missing_field(PICTURE_FIELD))?;
    if picture.is_empty() {
        return Err(ApiError::invalid_input("Picture is empty"));
    }

    let models = services::add_picture(&catalog, picture, &codes).await?;
    Ok(Json(models))
}

/// GET /api/v1/model/picture/:picture_id/list-models
pub async fn list_models(
    State(catalog): State<Arc<Catalog>>,
    Path(picture_id): Path<String>,
) -> ApiResult<Json<Vec<Model>>> {
    Ok(Json(services::models_for_picture(&catalog, &picture_id).await?))
}

/// PUT /api/v1/model/picture/:picture_id/tag
pub async fn tag_picture(
    State(catalog): State<Arc<Catalog>>,
    Path(picture_id): Path<String>,
    Json(req): Json<PictureCodesRequest>,
) -> ApiResult<Json<Vec<Model>>> {
    Ok(Json(
        services::tag_picture(&catalog, &picture_id, &req.codes).await?,
    ))
}

/// PUT /api/v1/model/picture/:picture_id/untag
pub async fn untag_picture(
    State(catalog): State<Arc<Catalog>>,
    Path(picture_id): Path<String>,
    Json(req): Json<PictureCodesRequest>,
) -> ApiResult<Json<Vec<Model>>> {
    Ok(Json(
        services::untag_picture(&catalog, &picture_id, &req.codes).await?,
    ))
}

/// DELETE /api/v1/model/picture/:picture_id
pub async fn delete_picture(
    State(catalog): State<Arc<Catalog>>,
    Path(picture_id): Path<String>,
) -> ApiResult<Json<Vec<Model>>> {
    Ok(Json(
        services::delete_all_for_picture(&catalog, &picture_id).await?,
    ))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the model router.
pub fn create_router() -> Router<AppState> {
    crud_routes::<Model>()
        .route(
            "/picture",
            post(add_picture).layer(DefaultBodyLimit::max(PICTURE_UPLOAD_LIMIT)),
        )
        .route("/picture/:picture_id", axum::routing::delete(delete_picture))
        .route("/picture/:picture_id/list-models", get(list_models))
        .route("/picture/:picture_id/tag", put(tag_picture))
        .route("/picture/:picture_id/untag", put(untag_picture))
}
