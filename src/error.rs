use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Which end of the accepted resolution range was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionBound {
    BelowMinimum,
    AboveMaximum,
    NotWholeNumber,
}

impl std::fmt::Display for ResolutionBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionBound::BelowMinimum => write!(f, "below minimum {}", crate::models::MIN_PPI),
            ResolutionBound::AboveMaximum => write!(f, "above maximum {}", crate::models::MAX_PPI),
            ResolutionBound::NotWholeNumber => f.write_str("not a whole number"),
        }
    }
}

/// Input rejected locally, before any codec call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid resolution {value}: {bound}")]
    InvalidResolution { value: f64, bound: ResolutionBound },

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid thickness {0}: must be between 1 and 5")]
    InvalidThickness(f64),

    #[error("Missing source: {0}")]
    MissingSource(&'static str),
}

/// Upload refused before its bytes are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File type not allowed: {0}")]
    UnsupportedType(String),

    #[error("File too large. Maximum size is {max_mb}MB")]
    TooLarge { max_mb: usize },
}

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Invalid image file: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedInput(String),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Encode error: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an image codec call, local or remote.
///
/// Reported verbatim to the user; never retried automatically.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadRejection),

    #[error("Image processing failed: {0}")]
    Imaging(#[from] ImagingError),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("A request is already in flight")]
    RequestInFlight,

    #[error("Processing task failed: {0}")]
    Task(String),
}

impl From<StoreError> for TransportError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => TransportError::NotFound(name),
            other => TransportError::Store(other),
        }
    }
}

/// Failure of a wizard command. State is left untouched when one is returned.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("File type not allowed: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large. Maximum size is {max_mb}MB")]
    PayloadTooLarge { max_mb: usize },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid image kind: {0}")]
    InvalidKind(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UploadRejection> for ApiError {
    fn from(e: UploadRejection) -> Self {
        match e {
            UploadRejection::UnsupportedType(what) => ApiError::UnsupportedMediaType(what),
            UploadRejection::TooLarge { max_mb } => ApiError::PayloadTooLarge { max_mb },
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::NotFound(name) => ApiError::NotFound(name),
            TransportError::Rejected(v) => ApiError::Validation(v),
            TransportError::Upload(rejection) => ApiError::from(rejection),
            TransportError::Imaging(ImagingError::Decode(msg))
            | TransportError::Imaging(ImagingError::UnsupportedInput(msg)) => {
                ApiError::InvalidImage(msg)
            }
            TransportError::Store(StoreError::InvalidName(name)) => ApiError::NotFound(name),
            other => ApiError::Processing(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidKind(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let error = ValidationError::InvalidResolution {
            value: 1201.0,
            bound: ResolutionBound::AboveMaximum,
        };
        assert_eq!(
            error.to_string(),
            "Invalid resolution 1201: above maximum 1200"
        );

        let error = ValidationError::InvalidResolution {
            value: 0.0,
            bound: ResolutionBound::BelowMinimum,
        };
        assert_eq!(error.to_string(), "Invalid resolution 0: below minimum 1");

        let error = ValidationError::InvalidThickness(7.0);
        assert_eq!(
            error.to_string(),
            "Invalid thickness 7: must be between 1 and 5"
        );

        let error = ValidationError::InvalidThickness(2.5);
        assert_eq!(
            error.to_string(),
            "Invalid thickness 2.5: must be between 1 and 5"
        );

        let error = ValidationError::InvalidResolution {
            value: 72.5,
            bound: ResolutionBound::NotWholeNumber,
        };
        assert_eq!(
            error.to_string(),
            "Invalid resolution 72.5: not a whole number"
        );
    }

    #[test]
    fn test_api_error_payload_too_large() {
        let error = ApiError::PayloadTooLarge { max_mb: 50 };
        assert_eq!(error.to_string(), "File too large. Maximum size is 50MB");
    }

    #[test]
    fn test_store_not_found_becomes_transport_not_found() {
        let error: TransportError = StoreError::NotFound("x.png".into()).into();
        assert!(matches!(error, TransportError::NotFound(ref n) if n == "x.png"));
    }

    #[test]
    fn test_transport_error_mapping() {
        let api: ApiError = TransportError::NotFound("gone.png".into()).into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = TransportError::Imaging(ImagingError::Decode("bad".into())).into();
        assert!(matches!(api, ApiError::InvalidImage(_)));

        let api: ApiError = TransportError::Rejected(ValidationError::InvalidThickness(9.0)).into();
        assert!(matches!(api, ApiError::Validation(_)));

        let api: ApiError = TransportError::Upload(UploadRejection::TooLarge { max_mb: 1 }).into();
        assert!(matches!(api, ApiError::PayloadTooLarge { max_mb: 1 }));

        let api: ApiError =
            TransportError::Upload(UploadRejection::UnsupportedType("notes.txt".into())).into();
        assert!(matches!(api, ApiError::UnsupportedMediaType(_)));

        let api: ApiError = TransportError::Task("panicked".into()).into();
        assert!(matches!(api, ApiError::Processing(_)));
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let response = ApiError::MissingField("image").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::Validation(ValidationError::UnsupportedFormat("gif".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::UnsupportedMediaType("text/plain".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let response = ApiError::PayloadTooLarge { max_mb: 50 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = ApiError::NotFound("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::Processing("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
