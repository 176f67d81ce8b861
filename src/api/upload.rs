use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::files::file_url;
use crate::error::ApiError;
use crate::models::{AppConfig, BlobKind, ImageInfo};
use crate::requests::upload::{check_file_type, check_size, too_large};
use crate::services::{ImageCodec, LocalCodec};

/// Multipart form accepted by `/api/upload`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// PNG, JPEG, BMP, TIFF or WebP file
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Reference to pass to `/api/enhance` or `/api/extract-outline`
    pub filename: String,
    pub image_info: ImageInfo,
    pub preview_url: String,
}

/// Upload an image
///
/// The file type is checked by extension and declared content type before
/// anything is decoded.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file or not a decodable image"),
        (status = 413, description = "File larger than the upload limit"),
        (status = 415, description = "File type not allowed"),
    ),
    tag = "Images"
)]
pub async fn handle_upload(
    State(codec): State<Arc<LocalCodec>>,
    State(config): State<Arc<AppConfig>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let max_bytes = config.max_upload_bytes;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingField("image"))?;
        check_file_type(&file_name, field.content_type())?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        check_size(bytes.len(), max_bytes)?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or(ApiError::MissingField("image"))?;
    tracing::debug!(file_name = %file_name, size = bytes.len(), "Upload received");

    let info = codec.upload(&file_name, bytes.to_vec()).await?;
    Ok(Json(UploadResponse {
        success: true,
        filename: info.filename.clone(),
        preview_url: file_url(BlobKind::Uploads, &info.filename),
        image_info: info,
    }))
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes).into()
    } else {
        ApiError::InvalidImage(e.body_text())
    }
}
