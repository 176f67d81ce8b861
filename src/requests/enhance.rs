//! Enhancement request builder.
//!
//! Turns raw user input into an [`EnhancementSpec`]. Checks run in a fixed
//! order and the first failure wins:
//!
//! 1. resolution on both axes
//! 2. physical values converted to pixels
//! 3. pixel width and height are positive integers
//! 4. output format
//!
//! The builder performs no I/O.

use crate::dimensions::{recompute, to_pixels};
use crate::error::ValidationError;
use crate::models::{Axis, EnhancementSpec, OutputFormat, PixelSize, Resolution, Unit};

/// Largest accepted target side in pixels.
pub const MAX_TARGET_DIMENSION: u32 = 20_000;

/// Raw enhancer input as the user entered it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceInput {
    pub source_ref: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: Unit,
    pub ppi_horizontal: u32,
    pub ppi_vertical: u32,
    pub lock_aspect: bool,
    /// Pixel size of the source image, used to fill a missing side
    pub reference: Option<PixelSize>,
    pub format: String,
}

impl Default for EnhanceInput {
    fn default() -> Self {
        let resolution = Resolution::default();
        Self {
            source_ref: String::new(),
            width: None,
            height: None,
            unit: Unit::Pixels,
            ppi_horizontal: resolution.horizontal(),
            ppi_vertical: resolution.vertical(),
            lock_aspect: true,
            reference: None,
            format: OutputFormat::default().extension().to_string(),
        }
    }
}

pub fn build(input: &EnhanceInput) -> Result<EnhancementSpec, ValidationError> {
    let resolution = Resolution::new(input.ppi_horizontal, input.ppi_vertical)?;

    let width = side_in_pixels(input.width, input.unit, resolution, Axis::Width)?;
    let height = side_in_pixels(input.height, input.unit, resolution, Axis::Height)?;

    let (width, height) = fill_missing(width, height, input.lock_aspect, input.reference)?;
    let target_width_px = positive_pixels(width, Axis::Width)?;
    let target_height_px = positive_pixels(height, Axis::Height)?;

    let output_format = OutputFormat::parse(&input.format)?;

    let source_ref = input.source_ref.trim();
    if source_ref.is_empty() {
        return Err(ValidationError::MissingSource("no uploaded image to enhance"));
    }

    Ok(EnhancementSpec {
        source_ref: source_ref.to_string(),
        target_width_px,
        target_height_px,
        resolution,
        lock_aspect: input.lock_aspect,
        output_format,
    })
}

fn side_in_pixels(
    value: Option<f64>,
    unit: Unit,
    resolution: Resolution,
    axis: Axis,
) -> Result<Option<f64>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidDimension(format!(
            "{axis:?} must be positive, got {value}"
        )));
    }
    match unit {
        Unit::Pixels => Ok(Some(value)),
        Unit::Physical => to_pixels(value, resolution.along(axis)).map(|px| Some(px as f64)),
    }
}

fn fill_missing(
    width: Option<f64>,
    height: Option<f64>,
    lock_aspect: bool,
    reference: Option<PixelSize>,
) -> Result<(f64, f64), ValidationError> {
    let reference = reference.filter(|r| !r.is_empty());
    let derive = |edited: Axis, value: f64, fallback: u32| -> f64 {
        match reference {
            Some(r) if lock_aspect => {
                recompute(edited, value, r.width as f64, r.height as f64, Unit::Pixels)
                    .unwrap_or(fallback as f64)
            }
            _ => fallback as f64,
        }
    };

    match (width, height, reference) {
        (Some(w), Some(h), _) => Ok((w, h)),
        (Some(w), None, Some(r)) => Ok((w, derive(Axis::Width, w, r.height))),
        (None, Some(h), Some(r)) => Ok((derive(Axis::Height, h, r.width), h)),
        (None, None, Some(r)) => Ok((r.width as f64, r.height as f64)),
        (None, _, None) => Err(ValidationError::InvalidDimension(
            "width is required".to_string(),
        )),
        (_, None, None) => Err(ValidationError::InvalidDimension(
            "height is required".to_string(),
        )),
    }
}

fn positive_pixels(value: f64, axis: Axis) -> Result<u32, ValidationError> {
    if value.fract() != 0.0 {
        return Err(ValidationError::InvalidDimension(format!(
            "{axis:?} must be a whole number of pixels, got {value}"
        )));
    }
    if value < 1.0 {
        return Err(ValidationError::InvalidDimension(format!(
            "{axis:?} must be at least 1 pixel, got {value}"
        )));
    }
    if value > MAX_TARGET_DIMENSION as f64 {
        return Err(ValidationError::InvalidDimension(format!(
            "{axis:?} must not exceed {MAX_TARGET_DIMENSION} pixels, got {value}"
        )));
    }
    Ok(value as u32)
}
