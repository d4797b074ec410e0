//! JPEG re-encoding of uploaded images.
//!
//! Decoding goes through the `image` crate (format sniffed from the bytes,
//! never from the filename) and applies the EXIF orientation, since the
//! re-encoded output carries no metadata. Encoding uses mozjpeg with progressive scans and
//! optimized Huffman tables. Two guards return the upload untouched when
//! re-encoding a JPEG could only make it bigger.

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_QUALITY: u8 = 100;

/// At or above this quality a JPEG upload that grows when re-encoded is
/// returned as-is.
pub const KEEP_ORIGINAL_MIN_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum EncodeError {
    /// The bytes are not an image any enabled decoder understands.
    #[error("Invalid image content")]
    InvalidContent,

    /// The JPEG encoder rejected the decoded image.
    #[error("Could not encode image: {detail}")]
    EncodeFailure { detail: String },
}

/// True for filenames ending in `.jpg` / `.jpeg`, in any case.
pub fn is_jpeg_filename(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

/// Re-encodes `raw` as a JPEG at `quality` (0-100).
///
/// `file_name` is only a hint: it decides whether the upload is treated as a
/// JPEG for the two pass-through rules.
///
/// * quality 100 on a JPEG returns `raw` without decoding it.
/// * quality >= 95 on a JPEG returns `raw` when the re-encode is larger.
///
/// Non-JPEG uploads are always re-encoded, even when the result grows.
pub fn encode(raw: Bytes, file_name: &str, quality: u8) -> Result<Bytes, EncodeError> {
    let quality = quality.min(MAX_QUALITY);
    let is_jpeg = is_jpeg_filename(file_name);
    let original_size = raw.len();

    if quality == MAX_QUALITY && is_jpeg {
        info!(
            "Quality 100% on JPEG file - returning original ({} bytes)",
            original_size
        );
        return Ok(raw);
    }

    let image = decode_rgb(&raw)?;
    let processed = encode_jpeg(&image, quality)?;
    let processed_size = processed.len();

    if quality >= KEEP_ORIGINAL_MIN_QUALITY && is_jpeg && processed_size > original_size {
        info!(
            "Processed JPEG larger than original ({} > {}) - returning original",
            processed_size, original_size
        );
        return Ok(raw);
    }

    Ok(Bytes::from(processed))
}

/// Decodes any supported format into upright 8-bit RGB. Alpha is discarded.
fn decode_rgb(raw: &[u8]) -> Result<RgbImage, EncodeError> {
    match decode_oriented(raw) {
        Ok(image) => Ok(image.to_rgb8()),
        Err(e) => {
            warn!("Failed to decode image bytes: {}", e);
            Err(EncodeError::InvalidContent)
        }
    }
}

fn decode_oriented(raw: &[u8]) -> image::ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()?
        .into_decoder()?;
    // Unreadable EXIF is not worth rejecting the upload over.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();

    // libjpeg reports some errors by unwinding through the FFI boundary.
    let result = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(f32::from(quality));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(image.as_raw())?;
        comp.finish()
    }));

    match result {
        Ok(Ok(jpeg)) if !jpeg.is_empty() => Ok(jpeg),
        Ok(Ok(_)) => Err(EncodeError::EncodeFailure {
            detail: "encoder produced no output".to_string(),
        }),
        Ok(Err(e)) => Err(EncodeError::EncodeFailure {
            detail: e.to_string(),
        }),
        Err(_) => Err(EncodeError::EncodeFailure {
            detail: format!("libjpeg aborted while encoding {}x{} image", width, height),
        }),
    }
}
