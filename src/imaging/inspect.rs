use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use crate::error::ImagingError;
use crate::models::{ImageInfo, OutputFormat};

/// A decoded image together with the container it came in.
pub struct Decoded {
    pub image: DynamicImage,
    pub format: OutputFormat,
}

/// Decode bytes, sniffing the format from the content rather than the name.
pub fn decode(bytes: &[u8]) -> Result<Decoded, ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    let detected = reader
        .format()
        .ok_or_else(|| ImagingError::UnsupportedInput("unrecognised image data".to_string()))?;
    let format = OutputFormat::from_image_format(detected)
        .ok_or_else(|| ImagingError::UnsupportedInput(format!("{detected:?}")))?;

    let image = reader
        .decode()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ImagingError::EmptyImage);
    }

    Ok(Decoded { image, format })
}

/// Metadata shown after an upload.
pub fn describe(filename: &str, size_bytes: u64, decoded: &Decoded) -> ImageInfo {
    let (width, height) = decoded.image.dimensions();
    let pixels = width as f64 * height as f64;
    ImageInfo {
        filename: filename.to_string(),
        width,
        height,
        size_bytes,
        format: decoded.format,
        color_mode: format!("{:?}", decoded.image.color()),
        megapixels: round_to(pixels / 1_000_000.0, 2),
        aspect_ratio: round_to(width as f64 / height as f64, 3),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
