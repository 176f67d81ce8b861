use async_trait::async_trait;
use image::GenericImageView;
use std::sync::Arc;

use super::blob_store::{result_name, upload_name, BlobStore};
use super::codec::ImageCodec;
use crate::dimensions::{fit_to_source, round_physical, to_physical};
use crate::error::{ImagingError, TransportError};
use crate::imaging::{self, EncodeOptions};
use crate::requests::upload::{check_file_type, check_size};
use crate::models::{
    AppConfig, BlobKind, EnhancementSpec, ImageInfo, OutlineConfig, OutlineSpec, OutputFormat,
    PixelSize, ProcessingResult, Resolution, ThicknessLevel,
};

/// Upload limit, encoder and edge detector settings taken from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingOptions {
    pub max_upload_bytes: usize,
    pub jpeg_quality: u8,
    pub outline: OutlineConfig,
}

impl From<&AppConfig> for ImagingOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            jpeg_quality: config.jpeg_quality,
            outline: config.outline,
        }
    }
}

impl Default for ImagingOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// In-process codec: blob store for bytes, `imaging` for pixels.
///
/// Decoding, resampling and encoding run on the blocking pool.
pub struct LocalCodec {
    store: Arc<dyn BlobStore>,
    options: ImagingOptions,
}

impl LocalCodec {
    pub fn new(store: Arc<dyn BlobStore>, options: ImagingOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Pixel size of a stored image.
    pub async fn source_size(&self, kind: BlobKind, name: &str) -> Result<PixelSize, TransportError> {
        let bytes = self.store.load(kind, name).await?;
        let (width, height) =
            blocking(move || imaging::decode(&bytes).map(|d| d.image.dimensions())).await?;
        Ok(PixelSize::new(width, height))
    }
}

/// Run CPU-heavy imaging work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T, TransportError>
where
    F: FnOnce() -> Result<T, ImagingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TransportError::Task(e.to_string()))?
        .map_err(TransportError::from)
}

struct Rendered {
    bytes: Vec<u8>,
    size: PixelSize,
}

fn render_enhanced(
    source: &[u8],
    target: PixelSize,
    lock_aspect: bool,
    format: OutputFormat,
    options: EncodeOptions,
) -> Result<Rendered, ImagingError> {
    let decoded = imaging::decode(source)?;
    let (width, height) = decoded.image.dimensions();
    let size = if lock_aspect {
        fit_to_source(PixelSize::new(width, height), target)
    } else {
        target
    };
    let resized = imaging::resample(&decoded.image, size);
    let bytes = imaging::encode(&resized, format, &options)?;
    Ok(Rendered { bytes, size })
}

fn render_outline(
    source: &[u8],
    thickness: ThicknessLevel,
    format: OutputFormat,
    options: ImagingOptions,
) -> Result<Rendered, ImagingError> {
    let decoded = imaging::decode(source)?;
    let lines = imaging::trace(&decoded.image, thickness, &options.outline);
    let size = PixelSize::new(lines.width(), lines.height());
    let bytes = imaging::encode(
        &image::DynamicImage::ImageLuma8(lines),
        format,
        &EncodeOptions {
            resolution: None,
            jpeg_quality: options.jpeg_quality,
        },
    )?;
    Ok(Rendered { bytes, size })
}

fn inches(px: u32, ppi: u32) -> Option<f64> {
    to_physical(px as f64, ppi).ok().map(round_physical)
}

#[async_trait]
impl ImageCodec for LocalCodec {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageInfo, TransportError> {
        check_file_type(file_name, None)?;
        check_size(bytes.len(), self.options.max_upload_bytes)?;

        let name = upload_name(file_name);
        let size_bytes = bytes.len() as u64;

        let (bytes, info) = {
            let name = name.clone();
            blocking(move || {
                let decoded = imaging::decode(&bytes)?;
                let info = imaging::describe(&name, size_bytes, &decoded);
                Ok((bytes, info))
            })
            .await?
        };

        self.store.save(BlobKind::Uploads, &name, bytes).await?;
        tracing::info!(
            filename = %info.filename,
            width = info.width,
            height = info.height,
            format = %info.format,
            "Stored upload"
        );
        Ok(info)
    }

    async fn enhance(&self, spec: &EnhancementSpec) -> Result<ProcessingResult, TransportError> {
        let source = self
            .store
            .load(BlobKind::Uploads, &spec.source_ref)
            .await?;

        let target = spec.target_size();
        let lock_aspect = spec.lock_aspect;
        let format = spec.output_format;
        let resolution: Resolution = spec.resolution;
        let options = EncodeOptions {
            resolution: Some(resolution),
            jpeg_quality: self.options.jpeg_quality,
        };
        let rendered =
            blocking(move || render_enhanced(&source, target, lock_aspect, format, options)).await?;

        let result_ref = result_name(&spec.source_ref, BlobKind::Enhanced, format);
        self.store
            .save(BlobKind::Enhanced, &result_ref, rendered.bytes)
            .await?;

        let (width, height) = (rendered.size.width, rendered.size.height);
        tracing::info!(
            source = %spec.source_ref,
            result_ref = %result_ref,
            width,
            height,
            ppi_horizontal = resolution.horizontal(),
            ppi_vertical = resolution.vertical(),
            "Enhancement complete"
        );

        Ok(ProcessingResult {
            original_kind: BlobKind::Uploads,
            original_ref: spec.source_ref.clone(),
            result_kind: BlobKind::Enhanced,
            result_ref,
            width,
            height,
            format,
            ppi_horizontal: Some(resolution.horizontal()),
            ppi_vertical: Some(resolution.vertical()),
            width_inches: inches(width, resolution.horizontal()),
            height_inches: inches(height, resolution.vertical()),
            thickness: None,
        })
    }

    async fn extract_outline(
        &self,
        spec: &OutlineSpec,
    ) -> Result<ProcessingResult, TransportError> {
        let source_kind = spec.source.kind();
        let source_ref = spec.source.name().to_string();
        let source = self.store.load(source_kind, &source_ref).await?;

        let thickness = spec.thickness;
        let format = spec.output_format;
        let options = self.options;
        let rendered =
            blocking(move || render_outline(&source, thickness, format, options)).await?;

        let result_ref = result_name(&source_ref, BlobKind::Outlined, format);
        self.store
            .save(BlobKind::Outlined, &result_ref, rendered.bytes)
            .await?;

        tracing::info!(
            source = %source_ref,
            %source_kind,
            result_ref = %result_ref,
            thickness = thickness.get(),
            "Outline extracted"
        );

        Ok(ProcessingResult {
            original_kind: source_kind,
            original_ref: source_ref,
            result_kind: BlobKind::Outlined,
            result_ref,
            width: rendered.size.width,
            height: rendered.size.height,
            format,
            ppi_horizontal: None,
            ppi_vertical: None,
            width_inches: None,
            height_inches: None,
            thickness: Some(thickness.get()),
        })
    }

    async fn fetch(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, TransportError> {
        Ok(self.store.load(kind, name).await?)
    }
}
