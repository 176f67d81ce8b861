use image::ImageFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Encodings accepted for uploads and produced for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Webp,
}

impl OutputFormat {
    /// Parse a user-facing format name (case-insensitive, `jpg`/`tif` aliases).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(ValidationError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format implied by a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::parse(ext).ok()
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(OutputFormat::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(OutputFormat::Jpeg),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some(OutputFormat::Bmp),
            "image/tiff" | "image/tif" => Some(OutputFormat::Tiff),
            "image/webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Bmp => Some(OutputFormat::Bmp),
            ImageFormat::Tiff => Some(OutputFormat::Tiff),
            ImageFormat::WebP => Some(OutputFormat::Webp),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Webp => ImageFormat::WebP,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Webp => "image/webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
