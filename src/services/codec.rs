use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{BlobKind, EnhancementSpec, ImageInfo, OutlineSpec, ProcessingResult};

/// Performs the actual pixel work behind the wizard.
///
/// Implemented in-process by [`super::LocalCodec`] and over HTTP by
/// [`crate::client::HttpCodec`]. Failures are returned as-is and never retried.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Store an uploaded image and report its metadata
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageInfo, TransportError>;

    /// Resample a stored upload and stamp its resolution
    async fn enhance(&self, spec: &EnhancementSpec) -> Result<ProcessingResult, TransportError>;

    /// Trace the edges of an upload or an enhanced result
    async fn extract_outline(&self, spec: &OutlineSpec)
        -> Result<ProcessingResult, TransportError>;

    /// Fetch the encoded bytes of a stored blob
    async fn fetch(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, TransportError>;
}
