use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::models::PixelSize;

/// Filter used when either side grows.
const UPSCALE_FILTER: FilterType = FilterType::CatmullRom;
/// Filter used when both sides shrink or stay.
const DOWNSCALE_FILTER: FilterType = FilterType::Triangle;

pub fn filter_for(source: PixelSize, target: PixelSize) -> FilterType {
    if target.width > source.width || target.height > source.height {
        UPSCALE_FILTER
    } else {
        DOWNSCALE_FILTER
    }
}

/// Resize to exactly `target`, ignoring the source ratio.
pub fn resample(image: &DynamicImage, target: PixelSize) -> DynamicImage {
    let (width, height) = image.dimensions();
    let source = PixelSize::new(width, height);
    if source == target {
        return image.clone();
    }
    let filter = filter_for(source, target);
    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = target.width,
        to_height = target.height,
        ?filter,
        "Resampling"
    );
    image.resize_exact(target.width, target.height, filter)
}
