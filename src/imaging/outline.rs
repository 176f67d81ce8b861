//! Edge trace: grayscale, blur, Canny, dilate by thickness, invert, threshold.
//!
//! The result is black lines on a white background with no grey levels.

use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;

use crate::models::{OutlineConfig, ThicknessLevel};

/// Cutoff applied after inversion.
const BINARY_THRESHOLD: u8 = 127;

/// Dilation applied for a thickness level, as `(radius, norm)`.
///
/// Level 1 leaves the one-pixel Canny lines as they are.
pub fn kernel_for(level: ThicknessLevel) -> Option<(u8, Norm)> {
    match level.get() {
        1 => None,
        2 => Some((1, Norm::L1)),
        3 => Some((1, Norm::LInf)),
        4 => Some((2, Norm::L1)),
        _ => Some((2, Norm::LInf)),
    }
}

pub fn trace(image: &DynamicImage, thickness: ThicknessLevel, config: &OutlineConfig) -> GrayImage {
    let gray = image.to_luma8();
    let blurred = if config.blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&gray, config.blur_sigma)
    } else {
        gray
    };
    let edges = imageproc::edges::canny(&blurred, config.canny_low, config.canny_high);

    let mut lines = match kernel_for(thickness) {
        Some((radius, norm)) => imageproc::morphology::dilate(&edges, norm, radius),
        None => edges,
    };
    image::imageops::invert(&mut lines);
    imageproc::contrast::threshold(&lines, BINARY_THRESHOLD)
}
