use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::files::{download_url, file_url};
use crate::error::ApiError;
use crate::error::ValidationError;
use crate::models::{
    ppi_from_number, AppConfig, BlobKind, ProcessingResult, Resolution, ThicknessLevel, Unit,
};
use crate::requests::{build_enhancement, build_outline, EnhanceInput, OutlineInput};
use crate::services::{ImageCodec, LocalCodec};

/// Enhancement parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EnhanceRequest {
    /// Upload reference returned by `/api/upload`
    #[serde(default)]
    pub filename: String,
    /// Target width in `unit`; derived from the source when omitted
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: Unit,
    /// Horizontal resolution (default from config)
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub ppi_horizontal: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub ppi_vertical: Option<f64>,
    /// Keep the source aspect ratio (default true)
    #[serde(default)]
    pub maintain_aspect: Option<bool>,
    /// png, jpg, bmp, tiff or webp (default png)
    #[serde(default)]
    pub format: Option<String>,
}

impl EnhanceRequest {
    fn to_input(&self, default_ppi: u32) -> Result<EnhanceInput, ValidationError> {
        let defaults = EnhanceInput::default();
        let ppi = |raw: Option<f64>| raw.map_or(Ok(default_ppi), ppi_from_number);
        Ok(EnhanceInput {
            source_ref: self.filename.clone(),
            width: self.width,
            height: self.height,
            unit: self.unit,
            ppi_horizontal: ppi(self.ppi_horizontal)?,
            ppi_vertical: ppi(self.ppi_vertical)?,
            lock_aspect: self.maintain_aspect.unwrap_or(defaults.lock_aspect),
            reference: None,
            format: self.format.clone().unwrap_or(defaults.format),
        })
    }
}

/// Outline parameters; exactly one of `filename` and `enhanced` is set
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OutlineRequest {
    /// Upload reference returned by `/api/upload`
    #[serde(default)]
    pub filename: Option<String>,
    /// Result reference returned by `/api/enhance`
    #[serde(default)]
    pub enhanced: Option<String>,
    /// Line thickness level 1-5 (default 1)
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
}

impl OutlineRequest {
    fn to_input(&self) -> Result<OutlineInput, ValidationError> {
        let defaults = OutlineInput::default();
        let thickness = match self.thickness {
            Some(raw) => ThicknessLevel::from_number(raw)?.get() as i64,
            None => defaults.thickness,
        };
        Ok(OutlineInput {
            upload_ref: self.filename.clone(),
            handed_off_ref: self.enhanced.clone(),
            thickness,
            format: self.format.clone().unwrap_or(defaults.format),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessResponse {
    pub success: bool,
    pub result: ProcessingResult,
    /// Inline preview of the result
    pub result_url: String,
    /// Inline preview of the source image
    pub original_url: String,
    pub download_url: String,
}

impl From<ProcessingResult> for ProcessResponse {
    fn from(result: ProcessingResult) -> Self {
        Self {
            success: true,
            result_url: file_url(result.result_kind, &result.result_ref),
            original_url: file_url(result.original_kind, &result.original_ref),
            download_url: download_url(result.result_kind, &result.result_ref),
            result,
        }
    }
}

/// Resample an upload and stamp its resolution
///
/// A missing width or height is derived from the source, through the aspect
/// lock when it is on. With the lock on and both sides given, the result is
/// fitted inside the requested box.
#[utoipa::path(
    post,
    path = "/api/enhance",
    request_body = EnhanceRequest,
    responses(
        (status = 200, description = "Enhanced image stored", body = ProcessResponse),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Image file not found"),
        (status = 500, description = "Processing failed"),
    ),
    tag = "Images"
)]
pub async fn handle_enhance(
    State(codec): State<Arc<LocalCodec>>,
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut input = request.to_input(config.default_ppi)?;

    let needs_reference = input.width.is_none() || input.height.is_none();
    if needs_reference && !input.source_ref.trim().is_empty() {
        // Reject a bad resolution before paying for a decode
        Resolution::new(input.ppi_horizontal, input.ppi_vertical)?;
        input.reference = Some(
            codec
                .source_size(BlobKind::Uploads, input.source_ref.trim())
                .await?,
        );
    }

    let spec = build_enhancement(&input)?;
    tracing::info!(
        source = %spec.source_ref,
        width = spec.target_width_px,
        height = spec.target_height_px,
        format = %spec.output_format,
        "Enhance request"
    );

    let result = codec.enhance(&spec).await?;
    Ok(Json(result.into()))
}

/// Trace the edges of an upload or an enhanced result
#[utoipa::path(
    post,
    path = "/api/extract-outline",
    request_body = OutlineRequest,
    responses(
        (status = 200, description = "Outline stored", body = ProcessResponse),
        (status = 400, description = "Invalid parameters or no image provided"),
        (status = 404, description = "Image file not found"),
        (status = 500, description = "Processing failed"),
    ),
    tag = "Images"
)]
pub async fn handle_extract_outline(
    State(codec): State<Arc<LocalCodec>>,
    Json(request): Json<OutlineRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let spec = build_outline(&request.to_input()?)?;
    tracing::info!(
        source = %spec.source.name(),
        thickness = spec.thickness.get(),
        format = %spec.output_format,
        "Outline request"
    );

    let result = codec.extract_outline(&spec).await?;
    Ok(Json(result.into()))
}
