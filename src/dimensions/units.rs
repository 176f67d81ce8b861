//! Pixel ↔ physical length conversion.
//!
//! All functions are pure. A resolution outside `[MIN_PPI, MAX_PPI]` is an
//! error naming the violated bound; it is never clamped.

use crate::error::ValidationError;
use crate::models::{check_ppi, Unit};

/// Convert a pixel count to inches at `ppu` points per inch.
///
/// The quotient is returned at full precision; use [`round_physical`] to
/// present it.
pub fn to_physical(px: f64, ppu: u32) -> Result<f64, ValidationError> {
    let ppu = check_ppi(ppu)?;
    Ok(px / ppu as f64)
}

/// Convert inches to the nearest whole pixel count at `ppu` points per inch.
pub fn to_pixels(physical: f64, ppu: u32) -> Result<u32, ValidationError> {
    let ppu = check_ppi(ppu)?;
    let px = (physical * ppu as f64).round();
    if !px.is_finite() || px < 0.0 || px > u32::MAX as f64 {
        return Err(ValidationError::InvalidDimension(format!(
            "{physical} in at {ppu} ppi is not a representable pixel count"
        )));
    }
    Ok(px as u32)
}

/// Round a physical length to the two decimals shown to users.
pub fn round_physical(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a value the way its unit is displayed.
pub fn round_for_unit(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Pixels => value.round(),
        Unit::Physical => round_physical(value),
    }
}

/// Re-express `value` from one unit in another.
///
/// Pixel results are whole numbers; physical results keep two decimals.
pub fn convert(value: f64, from: Unit, to: Unit, ppu: u32) -> Result<f64, ValidationError> {
    match (from, to) {
        (Unit::Pixels, Unit::Physical) => to_physical(value, ppu).map(round_physical),
        (Unit::Physical, Unit::Pixels) => to_pixels(value, ppu).map(f64::from),
        _ => {
            check_ppi(ppu)?;
            Ok(round_for_unit(value, to))
        }
    }
}
