use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::dimensions::{convert, recompute};
use crate::error::ApiError;
use crate::models::{ppi_from_number, AppConfig, Axis, Dimension, Unit};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculateDimensionsRequest {
    /// Reference width whose ratio is kept
    pub original_width: f64,
    pub original_height: f64,
    /// Side the user edited
    pub changed_dimension: Axis,
    pub new_value: f64,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculateDimensionsResponse {
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// False when the reference was unusable and the paired side was left alone
    pub recomputed: bool,
}

/// Recompute the paired dimension under the aspect lock
#[utoipa::path(
    post,
    path = "/api/calculate-dimensions",
    request_body = CalculateDimensionsRequest,
    responses(
        (status = 200, description = "Paired dimension", body = CalculateDimensionsResponse),
        (status = 400, description = "New value is not positive"),
    ),
    tag = "Helpers"
)]
pub async fn handle_calculate_dimensions(
    Json(request): Json<CalculateDimensionsRequest>,
) -> Result<Json<CalculateDimensionsResponse>, ApiError> {
    let edited = Dimension::new(request.new_value, request.unit)?.value();

    let paired = recompute(
        request.changed_dimension,
        edited,
        request.original_width,
        request.original_height,
        request.unit,
    )
    .ok();
    if paired.is_none() {
        tracing::debug!(
            original_width = request.original_width,
            original_height = request.original_height,
            "No usable reference, leaving paired dimension"
        );
    }

    let (width, height) = match request.changed_dimension {
        Axis::Width => (Some(edited), paired),
        Axis::Height => (paired, Some(edited)),
    };
    Ok(Json(CalculateDimensionsResponse {
        width,
        height,
        recomputed: paired.is_some(),
    }))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertUnitsRequest {
    pub value: f64,
    pub from: Unit,
    pub to: Unit,
    /// Resolution to convert at (default from config)
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub ppi: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertUnitsResponse {
    /// Whole pixels, or inches rounded to two decimals
    pub value: f64,
    pub unit: Unit,
}

/// Convert a length between pixels and inches
#[utoipa::path(
    post,
    path = "/api/convert-units",
    request_body = ConvertUnitsRequest,
    responses(
        (status = 200, description = "Converted value", body = ConvertUnitsResponse),
        (status = 400, description = "Value not positive or resolution out of range"),
    ),
    tag = "Helpers"
)]
pub async fn handle_convert_units(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<ConvertUnitsRequest>,
) -> Result<Json<ConvertUnitsResponse>, ApiError> {
    let length = Dimension::new(request.value, request.from)?;
    let ppi = match request.ppi {
        Some(raw) => ppi_from_number(raw)?,
        None => config.default_ppi,
    };
    let converted = convert(length.value(), length.unit(), request.to, ppi)?;
    Ok(Json(ConvertUnitsResponse {
        value: converted,
        unit: request.to,
    }))
}
