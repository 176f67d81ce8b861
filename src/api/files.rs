use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::imaging::sniff;
use crate::models::{BlobKind, OutputFormat};
use crate::services::{ImageCodec, LocalCodec};

/// Inline preview URL of a stored blob.
pub fn file_url(kind: BlobKind, name: &str) -> String {
    format!("/api/files/{kind}/{name}")
}

/// Attachment URL of a result.
pub fn download_url(kind: BlobKind, name: &str) -> String {
    format!("/api/download/{kind}/{name}")
}

/// Download a result as an attachment
#[utoipa::path(
    get,
    path = "/api/download/{kind}/{name}",
    params(
        ("kind" = String, Path, description = "`enhanced` or `outlined`"),
        ("name" = String, Path, description = "Result reference"),
    ),
    responses(
        (status = 200, description = "Encoded image", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid image kind"),
        (status = 404, description = "File not found"),
    ),
    tag = "Files"
)]
pub async fn handle_download(
    State(codec): State<Arc<LocalCodec>>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = match BlobKind::parse(&kind) {
        Some(k @ (BlobKind::Enhanced | BlobKind::Outlined)) => k,
        _ => return Err(ApiError::InvalidKind(kind)),
    };

    let bytes = codec.fetch(kind, &name).await?;
    tracing::info!(%kind, name = %name, size = bytes.len(), "Serving download");

    let disposition = format!("attachment; filename=\"{name}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&bytes, &name).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Show a stored image inline
#[utoipa::path(
    get,
    path = "/api/files/{kind}/{name}",
    params(
        ("kind" = String, Path, description = "`uploads`, `enhanced` or `outlined`"),
        ("name" = String, Path, description = "Blob reference"),
    ),
    responses(
        (status = 200, description = "Encoded image", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid image kind"),
        (status = 404, description = "File not found"),
    ),
    tag = "Files"
)]
pub async fn handle_file(
    State(codec): State<Arc<LocalCodec>>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = BlobKind::parse(&kind).ok_or(ApiError::InvalidKind(kind))?;
    let bytes = codec.fetch(kind, &name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&bytes, &name)),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bytes,
    )
        .into_response())
}

fn content_type(bytes: &[u8], name: &str) -> &'static str {
    sniff(bytes)
        .or_else(|| OutputFormat::from_file_name(name))
        .map_or("application/octet-stream", OutputFormat::mime_type)
}
