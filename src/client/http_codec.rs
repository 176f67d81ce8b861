use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use super::gate::InFlightGate;
use crate::api::{EnhanceRequest, OutlineRequest, ProcessResponse, UploadResponse};
use crate::error::TransportError;
use crate::models::{
    BlobKind, EnhancementSpec, ImageInfo, OutlineSpec, OutputFormat, ProcessingResult, SourceRef,
    Unit,
};
use crate::services::ImageCodec;

/// Characters escaped in a URL path segment; RFC 3986 unreserved ones pass.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Generous ceiling; large enhancements can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Codec that drives a remote inkline server.
///
/// At most one request is in flight; overlapping calls fail with
/// [`TransportError::RequestInFlight`] instead of being queued.
pub struct HttpCodec {
    base_url: String,
    client: reqwest::Client,
    gate: InFlightGate,
}

impl HttpCodec {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            gate: InFlightGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into an error carrying the server's message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);
        tracing::warn!(status = status.as_u16(), message = %message, "Server rejected request");

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(TransportError::NotFound(message))
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let _guard = self.gate.enter()?;
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl ImageCodec for HttpCodec {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageInfo, TransportError> {
        let _guard = self.gate.enter()?;

        let mime = OutputFormat::from_file_name(file_name)
            .map_or("application/octet-stream", OutputFormat::mime_type);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = Self::check(response).await?.json().await?;
        Ok(upload.image_info)
    }

    async fn enhance(&self, spec: &EnhancementSpec) -> Result<ProcessingResult, TransportError> {
        let request = EnhanceRequest {
            filename: spec.source_ref.clone(),
            width: Some(spec.target_width_px as f64),
            height: Some(spec.target_height_px as f64),
            unit: Unit::Pixels,
            ppi_horizontal: Some(spec.resolution.horizontal() as f64),
            ppi_vertical: Some(spec.resolution.vertical() as f64),
            maintain_aspect: Some(spec.lock_aspect),
            format: Some(spec.output_format.extension().to_string()),
        };
        let response: ProcessResponse = self.post_json("/api/enhance", &request).await?;
        Ok(response.result)
    }

    async fn extract_outline(
        &self,
        spec: &OutlineSpec,
    ) -> Result<ProcessingResult, TransportError> {
        let (filename, enhanced) = match &spec.source {
            SourceRef::Upload(name) => (Some(name.clone()), None),
            SourceRef::Enhanced(name) => (None, Some(name.clone())),
        };
        let request = OutlineRequest {
            filename,
            enhanced,
            thickness: Some(spec.thickness.get() as f64),
            format: Some(spec.output_format.extension().to_string()),
        };
        let response: ProcessResponse = self.post_json("/api/extract-outline", &request).await?;
        Ok(response.result)
    }

    async fn fetch(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, TransportError> {
        let _guard = self.gate.enter()?;
        let path = format!(
            "/api/files/{kind}/{}",
            utf8_percent_encode(name, PATH_SEGMENT)
        );
        let response = self.client.get(self.url(&path)).send().await?;
        Ok(Self::check(response).await?.bytes().await?.to_vec())
    }
}
