//! Outline request builder.
//!
//! The thickness level is a UI ordinal. It is range-checked here and passed
//! through unchanged; the codec decides what kernel a level means.

use crate::error::ValidationError;
use crate::models::{OutlineSpec, OutputFormat, SourceRef, ThicknessLevel};

/// Raw outliner input.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineInput {
    /// Reference of an image uploaded on the outliner page
    pub upload_ref: Option<String>,
    /// Reference handed off from the enhancer
    pub handed_off_ref: Option<String>,
    pub thickness: i64,
    pub format: String,
}

impl Default for OutlineInput {
    fn default() -> Self {
        Self {
            upload_ref: None,
            handed_off_ref: None,
            thickness: ThicknessLevel::default().get() as i64,
            format: OutputFormat::default().extension().to_string(),
        }
    }
}

pub fn build(input: &OutlineInput) -> Result<OutlineSpec, ValidationError> {
    let thickness = ThicknessLevel::new(input.thickness)?;

    let upload = non_empty(input.upload_ref.as_deref());
    let handed_off = non_empty(input.handed_off_ref.as_deref());
    let source = match (upload, handed_off) {
        (Some(name), None) => SourceRef::Upload(name.to_string()),
        (None, Some(name)) => SourceRef::Enhanced(name.to_string()),
        (None, None) => return Err(ValidationError::MissingSource("no image provided")),
        (Some(_), Some(_)) => {
            return Err(ValidationError::MissingSource(
                "both an upload and a handed-off result were given",
            ))
        }
    };

    let output_format = OutputFormat::parse(&input.format)?;

    Ok(OutlineSpec {
        source,
        thickness,
        output_format,
    })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_input(thickness: i64) -> OutlineInput {
        OutlineInput {
            upload_ref: Some("abc_photo.png".to_string()),
            thickness,
            ..Default::default()
        }
    }

    #[test]
    fn test_thickness_bounds() {
        for level in [0, 6, 7, -1] {
            assert_eq!(
                build(&upload_input(level)).unwrap_err(),
                ValidationError::InvalidThickness(level as f64)
            );
        }
        assert_eq!(build(&upload_input(1)).unwrap().thickness.get(), 1);
        assert_eq!(build(&upload_input(5)).unwrap().thickness.get(), 5);
    }

    #[test]
    fn test_thickness_checked_before_source() {
        let err = build(&OutlineInput {
            thickness: 9,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidThickness(9.0));
    }

    #[test]
    fn test_handed_off_source() {
        let spec = build(&OutlineInput {
            handed_off_ref: Some("enh_123".to_string()),
            thickness: 3,
            format: "jpg".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(spec.source, SourceRef::Enhanced("enh_123".to_string()));
        assert_eq!(spec.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_source_must_be_exactly_one() {
        let none = build(&OutlineInput::default()).unwrap_err();
        assert!(matches!(none, ValidationError::MissingSource(_)));

        let empty = build(&OutlineInput {
            upload_ref: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(empty, ValidationError::MissingSource(_)));

        let both = build(&OutlineInput {
            upload_ref: Some("a.png".to_string()),
            handed_off_ref: Some("b.png".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(both, ValidationError::MissingSource(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let err = build(&OutlineInput {
            format: "svg".to_string(),
            ..upload_input(2)
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedFormat("svg".to_string()));
    }
}
