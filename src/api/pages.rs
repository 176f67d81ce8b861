//! Browser wizard pages served from the embedded `web/` folder.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::assets;

pub async fn handle_index() -> Response {
    serve("index.html")
}

pub async fn handle_enhancer() -> Response {
    serve("enhancer.html")
}

pub async fn handle_outliner() -> Response {
    serve("outliner.html")
}

pub async fn handle_static(Path(path): Path<String>) -> Response {
    serve(&path)
}

fn serve(path: &str) -> Response {
    match assets::web_asset(path) {
        Some(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.data).into_response(),
        None => {
            tracing::debug!(path, "Web asset not found");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
