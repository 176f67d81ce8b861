//! Test fixtures and constants.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "inkline-test-boundary";

/// White image with a filled black rectangle in the middle, so edge
/// detection has something to find.
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let (x0, x1) = (width / 4, width * 3 / 4);
    let (y0, y1) = (height / 4, height * 3 / 4);
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    img
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    encode(sample_image(width, height), ImageFormat::Png)
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(sample_image(width, height), ImageFormat::Jpeg)
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

/// Build a multipart/form-data body holding one file field
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Decode any supported image and return its pixel size
pub fn image_size(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).expect("decode result");
    (img.width(), img.height())
}
