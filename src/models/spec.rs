use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{OutputFormat, PixelSize, Resolution};
use crate::error::ValidationError;

/// Lowest outline thickness level.
pub const MIN_THICKNESS: u8 = 1;
/// Highest outline thickness level.
pub const MAX_THICKNESS: u8 = 5;

/// Storage area a blob lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    Uploads,
    Enhanced,
    Outlined,
}

impl BlobKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploads" | "upload" => Some(BlobKind::Uploads),
            "enhanced" => Some(BlobKind::Enhanced),
            "outlined" => Some(BlobKind::Outlined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlobKind::Uploads => "uploads",
            BlobKind::Enhanced => "enhanced",
            BlobKind::Outlined => "outlined",
        }
    }
}

impl std::fmt::Display for BlobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated resize request, consumed once by an image codec.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementSpec {
    pub source_ref: String,
    pub target_width_px: u32,
    pub target_height_px: u32,
    pub resolution: Resolution,
    pub lock_aspect: bool,
    pub output_format: OutputFormat,
}

impl EnhancementSpec {
    pub fn target_size(&self) -> PixelSize {
        PixelSize::new(self.target_width_px, self.target_height_px)
    }
}

/// Image an outline is traced from.
///
/// Being an enum, exactly one source is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Freshly uploaded image
    Upload(String),
    /// Result handed off from the enhancer
    Enhanced(String),
}

impl SourceRef {
    pub fn name(&self) -> &str {
        match self {
            SourceRef::Upload(name) | SourceRef::Enhanced(name) => name,
        }
    }

    pub fn kind(&self) -> BlobKind {
        match self {
            SourceRef::Upload(_) => BlobKind::Uploads,
            SourceRef::Enhanced(_) => BlobKind::Enhanced,
        }
    }
}

/// UI-facing line thickness ordinal in `[MIN_THICKNESS, MAX_THICKNESS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ThicknessLevel(u8);

impl ThicknessLevel {
    pub fn new(level: i64) -> Result<Self, ValidationError> {
        if level < MIN_THICKNESS as i64 || level > MAX_THICKNESS as i64 {
            return Err(ValidationError::InvalidThickness(level as f64));
        }
        Ok(Self(level as u8))
    }

    /// Level from an untyped number; fractions are rejected rather than rounded.
    pub fn from_number(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(ValidationError::InvalidThickness(value));
        }
        Self::new(value as i64)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ThicknessLevel {
    fn default() -> Self {
        Self(MIN_THICKNESS)
    }
}

/// Validated outline request, consumed once by an image codec.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineSpec {
    pub source: SourceRef,
    pub thickness: ThicknessLevel,
    pub output_format: OutputFormat,
}

/// Metadata reported for an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageInfo {
    /// Opaque reference of the stored upload
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub format: OutputFormat,
    /// Pixel layout reported by the decoder (e.g. "Rgb8")
    pub color_mode: String,
    pub megapixels: f64,
    /// width / height, 3 decimals
    pub aspect_ratio: f64,
}

impl ImageInfo {
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }
}

/// Outcome of an enhance or outline operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessingResult {
    pub original_kind: BlobKind,
    pub original_ref: String,
    pub result_kind: BlobKind,
    pub result_ref: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppi_horizontal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppi_vertical: Option<u32>,
    /// Printed width in inches at the stamped resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_inches: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_inches: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<u8>,
}
