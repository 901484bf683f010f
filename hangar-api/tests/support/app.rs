//! Router and request helpers shared by the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use hangar_api::{create_api_router, ApiConfig, Catalog, CatalogConfig};
use hangar_storage::{BackingStore, InMemoryBackingStore, InMemoryObjectStore};
use serde_json::Value;
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "hangar-test-boundary";

/// A router over in-memory stores, with handles on both stores.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<Catalog>,
    pub store: Arc<InMemoryBackingStore>,
    pub pictures: Arc<InMemoryObjectStore>,
}

pub async fn test_app() -> Result<TestApp, String> {
    test_app_with(CatalogConfig::default()).await
}

pub async fn test_app_with(config: CatalogConfig) -> Result<TestApp, String> {
    let store = Arc::new(
        InMemoryBackingStore::with_tables(Catalog::table_schemas(&config))
            .map_err(|e| e.to_string())?,
    );
    let pictures = Arc::new(InMemoryObjectStore::new(config.picture_bucket.clone()));
    let catalog = Arc::new(
        Catalog::open(config, store.clone(), pictures.clone())
            .await
            .map_err(|e| e.to_string())?,
    );
    let router = create_api_router(catalog.clone(), &ApiConfig::default());
    Ok(TestApp {
        router,
        catalog,
        store,
        pictures,
    })
}

/// Router over an arbitrary backing store.
pub async fn router_over(store: Arc<dyn BackingStore>) -> Result<Router, String> {
    let config = CatalogConfig::default();
    let pictures = Arc::new(InMemoryObjectStore::new(config.picture_bucket.clone()));
    let catalog = Catalog::open(config, store, pictures)
        .await
        .map_err(|e| e.to_string())?;
    Ok(create_api_router(Arc::new(catalog), &ApiConfig::default()))
}

/// Percent-encode a code for use as a path segment.
pub fn path_code(code: &str) -> String {
    code.replace('%', "%25")
        .replace('#', "%23")
        .replace('/', "%2F")
        .replace(' ', "%20")
}

/// Send one request and decode the body as JSON (plain text bodies come
/// back as a JSON string).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), String> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| e.to_string())?;

    let response = router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;
    read_response(response).await
}

/// Upload a picture through the multipart route.
pub async fn upload_picture(
    router: &Router,
    picture: &[u8],
    model_list: &str,
) -> Result<(StatusCode, Value), String> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"modelList\"\r\n\r\n{list}\r\n",
            b = MULTIPART_BOUNDARY,
            list = model_list
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"model.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            b = MULTIPART_BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(picture);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/model/picture")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .map_err(|e| e.to_string())?;

    let response = router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;
    read_response(response).await
}

async fn read_response(
    response: axum::response::Response,
) -> Result<(StatusCode, Value), String> {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
    Ok((status, value))
}

/// Codes of a JSON array of records.
pub fn codes(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["code"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
