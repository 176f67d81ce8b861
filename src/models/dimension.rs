use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ResolutionBound, ValidationError};

/// Lowest accepted resolution in points per inch.
pub const MIN_PPI: u32 = 1;
/// Highest accepted resolution in points per inch.
pub const MAX_PPI: u32 = 1200;
/// Resolution assumed when the user does not provide one.
pub const DEFAULT_PPI: u32 = 72;

/// Unit a dimension value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    #[serde(alias = "px")]
    Pixels,
    /// Physical length in inches
    #[serde(alias = "inches", alias = "in")]
    Physical,
}

impl Unit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Some(Unit::Pixels),
            "in" | "inch" | "inches" | "physical" => Some(Unit::Physical),
            _ => None,
        }
    }
}

/// Which side of a width/height pair the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn paired(self) -> Self {
        match self {
            Axis::Width => Axis::Height,
            Axis::Height => Axis::Width,
        }
    }
}

/// A strictly positive length in a given unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    value: f64,
    unit: Unit,
}

impl Dimension {
    pub fn new(value: f64, unit: Unit) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::InvalidDimension(format!(
                "{value} is not a positive {unit:?} value"
            )));
        }
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Horizontal and vertical resolution in points per inch.
///
/// Both axes are guaranteed to lie in `[MIN_PPI, MAX_PPI]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Resolution {
    horizontal: u32,
    vertical: u32,
}

impl Resolution {
    pub fn new(horizontal: u32, vertical: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            horizontal: check_ppi(horizontal)?,
            vertical: check_ppi(vertical)?,
        })
    }

    pub fn horizontal(&self) -> u32 {
        self.horizontal
    }

    pub fn vertical(&self) -> u32 {
        self.vertical
    }

    /// Resolution along the given axis.
    pub fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Width => self.horizontal,
            Axis::Height => self.vertical,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            horizontal: DEFAULT_PPI,
            vertical: DEFAULT_PPI,
        }
    }
}

/// Reject a resolution outside `[MIN_PPI, MAX_PPI]`, naming the violated bound.
pub fn check_ppi(ppi: u32) -> Result<u32, ValidationError> {
    ppi_from_number(ppi as f64)
}

/// Validate a resolution as it arrives from JSON or a form: any number,
/// including negative and fractional ones.
pub fn ppi_from_number(value: f64) -> Result<u32, ValidationError> {
    let bound = if value.is_nan() || value < MIN_PPI as f64 {
        ResolutionBound::BelowMinimum
    } else if value > MAX_PPI as f64 {
        ResolutionBound::AboveMaximum
    } else if value.fract() != 0.0 {
        ResolutionBound::NotWholeNumber
    } else {
        return Ok(value as u32);
    };
    Err(ValidationError::InvalidResolution { value, bound })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_rejects_non_positive() {
        assert!(Dimension::new(0.0, Unit::Pixels).is_err());
        assert!(Dimension::new(-3.0, Unit::Physical).is_err());
        assert!(Dimension::new(f64::NAN, Unit::Pixels).is_err());
        assert_eq!(Dimension::new(2.5, Unit::Physical).unwrap().value(), 2.5);
    }

    #[test]
    fn test_resolution_bounds() {
        assert_eq!(
            Resolution::new(0, 72),
            Err(ValidationError::InvalidResolution {
                value: 0.0,
                bound: ResolutionBound::BelowMinimum
            })
        );
        assert_eq!(
            Resolution::new(72, 1201),
            Err(ValidationError::InvalidResolution {
                value: 1201.0,
                bound: ResolutionBound::AboveMaximum
            })
        );
        let res = Resolution::new(1, 1200).unwrap();
        assert_eq!(res.along(Axis::Width), 1);
        assert_eq!(res.along(Axis::Height), 1200);
    }

    #[test]
    fn test_ppi_from_number() {
        assert_eq!(ppi_from_number(300.0), Ok(300));
        assert_eq!(
            ppi_from_number(-5.0),
            Err(ValidationError::InvalidResolution {
                value: -5.0,
                bound: ResolutionBound::BelowMinimum
            })
        );
        assert_eq!(
            ppi_from_number(72.5),
            Err(ValidationError::InvalidResolution {
                value: 72.5,
                bound: ResolutionBound::NotWholeNumber
            })
        );
        assert!(ppi_from_number(f64::NAN).is_err());
        assert!(ppi_from_number(1e12).is_err());
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(Unit::parse("px"), Some(Unit::Pixels));
        assert_eq!(Unit::parse("Inches"), Some(Unit::Physical));
        assert_eq!(Unit::parse("cm"), None);
    }

    #[test]
    fn test_axis_paired() {
        assert_eq!(Axis::Width.paired(), Axis::Height);
        assert_eq!(Axis::Height.paired(), Axis::Width);
    }
}
