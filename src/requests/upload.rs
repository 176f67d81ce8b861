//! Upload admission checks shared by the HTTP handler and the in-process codec.

use crate::error::UploadRejection;
use crate::models::OutputFormat;

/// Accept only the supported image types, by extension and declared MIME.
///
/// `application/octet-stream` and a missing content type defer to the
/// extension.
pub fn check_file_type(
    file_name: &str,
    content_type: Option<&str>,
) -> Result<OutputFormat, UploadRejection> {
    let format = OutputFormat::from_file_name(file_name)
        .ok_or_else(|| UploadRejection::UnsupportedType(file_name.to_string()))?;
    match content_type {
        Some(mime) if mime != "application/octet-stream" && OutputFormat::from_mime(mime).is_none() => {
            Err(UploadRejection::UnsupportedType(mime.to_string()))
        }
        _ => Ok(format),
    }
}

pub fn check_size(len: usize, max_bytes: usize) -> Result<(), UploadRejection> {
    if len > max_bytes {
        return Err(too_large(max_bytes));
    }
    Ok(())
}

pub fn too_large(max_bytes: usize) -> UploadRejection {
    UploadRejection::TooLarge {
        max_mb: max_bytes / (1024 * 1024),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_type() {
        assert_eq!(
            check_file_type("photo.png", Some("image/png")),
            Ok(OutputFormat::Png)
        );
        assert_eq!(check_file_type("scan.TIF", None), Ok(OutputFormat::Tiff));
        assert!(check_file_type("photo.jpg", Some("application/octet-stream")).is_ok());
        assert_eq!(
            check_file_type("notes.txt", Some("text/plain")),
            Err(UploadRejection::UnsupportedType("notes.txt".to_string()))
        );
        assert_eq!(
            check_file_type("photo.png", Some("text/html")),
            Err(UploadRejection::UnsupportedType("text/html".to_string()))
        );
        assert!(check_file_type("anim.gif", Some("image/gif")).is_err());
        assert!(check_file_type("noext", None).is_err());
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(1024, 1024).is_ok());
        assert_eq!(
            check_size(1025, 1024),
            Err(UploadRejection::TooLarge { max_mb: 0 })
        );
        assert_eq!(
            too_large(50 * 1024 * 1024).to_string(),
            "File too large. Maximum size is 50MB"
        );
    }
}
