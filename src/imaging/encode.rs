//! Output encoding.
//!
//! PNG (`pHYs`), JPEG (JFIF density), TIFF (`XResolution`/`YResolution` in
//! inches) and BMP (pixels per meter in the info header) carry the requested
//! resolution. WebP is written without it.

use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::io::{Cursor, Seek, Write};
use tiff::encoder::{colortype, Rational, TiffEncoder, TiffValue};
use tiff::tags::ResolutionUnit;

use crate::error::ImagingError;
use crate::models::{OutputFormat, Resolution};

const METERS_PER_INCH: f64 = 0.0254;

/// `biXPelsPerMeter` / `biYPelsPerMeter`: 14-byte file header plus 24 into
/// the info header.
const BMP_X_PPM_OFFSET: usize = 38;
const BMP_Y_PPM_OFFSET: usize = 42;

pub struct EncodeOptions {
    /// Stamped into formats that support it
    pub resolution: Option<Resolution>,
    pub jpeg_quality: u8,
}

pub fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>, ImagingError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ImagingError::EmptyImage);
    }

    match format {
        OutputFormat::Png => encode_png(image, options.resolution),
        OutputFormat::Jpeg => encode_jpeg(image, options),
        OutputFormat::Tiff => encode_tiff(image, options.resolution),
        OutputFormat::Bmp => {
            let mut bytes = encode_with_image(image, format)?;
            if let Some(resolution) = options.resolution {
                stamp_bmp_resolution(&mut bytes, resolution)?;
            }
            Ok(bytes)
        }
        OutputFormat::Webp => encode_with_image(image, format),
    }
}

fn encode_with_image(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, ImagingError> {
    let normalized = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };
    let mut buf = Cursor::new(Vec::new());
    normalized
        .write_to(&mut buf, format.image_format())
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

fn stamp_bmp_resolution(bytes: &mut [u8], resolution: Resolution) -> Result<(), ImagingError> {
    if bytes.len() < BMP_Y_PPM_OFFSET + 4 || &bytes[0..2] != b"BM" {
        return Err(ImagingError::Encode("BMP header too short".to_string()));
    }
    let x = ppi_to_ppm(resolution.horizontal()).to_le_bytes();
    let y = ppi_to_ppm(resolution.vertical()).to_le_bytes();
    bytes[BMP_X_PPM_OFFSET..BMP_X_PPM_OFFSET + 4].copy_from_slice(&x);
    bytes[BMP_Y_PPM_OFFSET..BMP_Y_PPM_OFFSET + 4].copy_from_slice(&y);
    Ok(())
}

fn encode_tiff(image: &DynamicImage, resolution: Option<Resolution>) -> Result<Vec<u8>, ImagingError> {
    let (width, height) = image.dimensions();
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).map_err(tiff_error)?;
        match image {
            DynamicImage::ImageLuma8(img) => write_tiff::<colortype::Gray8, _>(
                &mut encoder,
                (width, height),
                img.as_raw(),
                resolution,
            )?,
            other if other.color().has_alpha() => write_tiff::<colortype::RGBA8, _>(
                &mut encoder,
                (width, height),
                other.to_rgba8().as_raw(),
                resolution,
            )?,
            other => write_tiff::<colortype::RGB8, _>(
                &mut encoder,
                (width, height),
                other.to_rgb8().as_raw(),
                resolution,
            )?,
        }
    }
    Ok(buf.into_inner())
}

fn write_tiff<C, W>(
    encoder: &mut TiffEncoder<W>,
    (width, height): (u32, u32),
    data: &[C::Inner],
    resolution: Option<Resolution>,
) -> Result<(), ImagingError>
where
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
    W: Write + Seek,
{
    let mut image = encoder.new_image::<C>(width, height).map_err(tiff_error)?;
    if let Some(resolution) = resolution {
        image.resolution_unit(ResolutionUnit::Inch);
        image.x_resolution(Rational {
            n: resolution.horizontal(),
            d: 1,
        });
        image.y_resolution(Rational {
            n: resolution.vertical(),
            d: 1,
        });
    }
    image.write_data(data).map_err(tiff_error)
}

fn tiff_error(e: tiff::TiffError) -> ImagingError {
    ImagingError::Encode(e.to_string())
}

/// Points per inch to pixels per meter, as `pHYs` stores them.
pub fn ppi_to_ppm(ppi: u32) -> u32 {
    (ppi as f64 / METERS_PER_INCH).round() as u32
}

fn encode_png(image: &DynamicImage, resolution: Option<Resolution>) -> Result<Vec<u8>, ImagingError> {
    let (width, height) = image.dimensions();
    let (color, data) = match image {
        DynamicImage::ImageLuma8(img) => (png::ColorType::Grayscale, img.as_raw().clone()),
        DynamicImage::ImageLumaA8(img) => (png::ColorType::GrayscaleAlpha, img.as_raw().clone()),
        DynamicImage::ImageRgb8(img) => (png::ColorType::Rgb, img.as_raw().clone()),
        other if other.color().has_alpha() => (png::ColorType::Rgba, other.to_rgba8().into_raw()),
        other => (png::ColorType::Rgb, other.to_rgb8().into_raw()),
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        if let Some(resolution) = resolution {
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppi_to_ppm(resolution.horizontal()),
                yppu: ppi_to_ppm(resolution.vertical()),
                unit: png::Unit::Meter,
            }));
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| ImagingError::Encode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| ImagingError::Encode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    // pHYs is a display chunk and survives StripChunks::Safe
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    Ok(optimized)
}

fn encode_jpeg(image: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, ImagingError> {
    let rgb = flatten_on_white(image);

    let mut buf = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality);
    if let Some(resolution) = options.resolution {
        encoder.set_pixel_density(PixelDensity {
            density: (
                resolution.horizontal() as u16,
                resolution.vertical() as u16,
            ),
            unit: PixelDensityUnit::Inches,
        });
    }
    encoder
        .encode_image(&rgb)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Composite any alpha channel over white; JPEG has no transparency.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Format detected from the content of `bytes`.
pub fn sniff(bytes: &[u8]) -> Option<OutputFormat> {
    image::guess_format(bytes)
        .ok()
        .and_then(OutputFormat::from_image_format)
}
