//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{BlobStore, FsBlobStore, ImagingOptions, LocalCodec};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<LocalCodec>,
}

/// Create application state backed by the filesystem store.
pub async fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = FsBlobStore::new(&config.storage_dir);
    store
        .ensure_dirs()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare {}: {e}", config.storage_dir.display()))?;
    tracing::info!(storage_dir = %config.storage_dir.display(), "Blob store ready");
    Ok(create_app_state_with_store(config, Arc::new(store)))
}

/// Create application state on an arbitrary blob store.
pub fn create_app_state_with_store(config: AppConfig, store: Arc<dyn BlobStore>) -> AppState {
    let codec = Arc::new(LocalCodec::new(store, ImagingOptions::from(&config)));
    AppState {
        config: Arc::new(config),
        codec,
    }
}

/// Build the router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        // Image API
        .route("/api/upload", post(handle_upload))
        .route("/api/enhance", post(handle_enhance))
        .route("/api/extract-outline", post(handle_extract_outline))
        .route("/api/download/:kind/:name", get(handle_download))
        .route("/api/files/:kind/:name", get(handle_file))
        // Helpers
        .route(
            "/api/calculate-dimensions",
            post(api::handle_calculate_dimensions),
        )
        .route("/api/convert-units", post(handle_convert_units))
        // Wizard
        .route("/", get(api::pages::handle_index))
        .route("/enhancer", get(api::pages::handle_enhancer))
        .route("/outliner", get(api::pages::handle_outliner))
        .route("/static/*path", get(api::pages::handle_static))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    api::handle_upload(State(state.codec), State(state.config), multipart).await
}

async fn handle_enhance(
    State(state): State<AppState>,
    body: Json<api::EnhanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    api::handle_enhance(State(state.codec), State(state.config), body).await
}

async fn handle_extract_outline(
    State(state): State<AppState>,
    body: Json<api::OutlineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    api::handle_extract_outline(State(state.codec), body).await
}

async fn handle_download(
    State(state): State<AppState>,
    path: Path<(String, String)>,
) -> Result<Response, ApiError> {
    api::handle_download(State(state.codec), path).await
}

async fn handle_file(
    State(state): State<AppState>,
    path: Path<(String, String)>,
) -> Result<Response, ApiError> {
    api::handle_file(State(state.codec), path).await
}

async fn handle_convert_units(
    State(state): State<AppState>,
    body: Json<api::ConvertUnitsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    api::handle_convert_units(State(state.config), body).await
}
