//! Image decoding — turns uploaded bytes into pixel dimensions and a bitmap.
//!
//! The layout engine never touches bytes; it consumes already-decoded
//! dimensions (see `layout::ImageDims`). This module is the decoding step in
//! front of it: sniff the format from the byte content, decode, and report
//! anything unusable as `InvalidImage` so the handler can apply its
//! skip-with-warning batch policy.
//!
//! Decoding is CPU-bound — callers run it inside `tokio::task::spawn_blocking`.

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::errors::AppError;
use crate::layout::ImageDims;

/// A decoded upload, ready for placement planning and PDF embedding.
pub struct DecodedImage {
    /// Client-supplied file name, kept for skip warnings and logs.
    pub file_name: String,
    pub format: ImageFormat,
    pub dims: ImageDims,
    pub bitmap: DynamicImage,
}

/// Sniffs the image format from the byte content, ignoring any declared
/// content type (browsers lie; magic bytes don't).
///
/// Only JPEG, PNG, and WEBP are accepted.
pub fn sniff_format(bytes: &[u8], file_name: &str) -> Result<ImageFormat, AppError> {
    let format = image::guess_format(bytes)
        .map_err(|_| AppError::InvalidImage(format!("'{file_name}' is not a recognized image")))?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP => Ok(format),
        other => Err(AppError::InvalidImage(format!(
            "'{file_name}' has unsupported format {other:?} (expected JPEG, PNG, or WEBP)"
        ))),
    }
}

/// Decodes one uploaded file into a [`DecodedImage`].
///
/// A decode failure or an unsupported format is an `InvalidImage` error; the
/// caller decides whether that skips the file or aborts the batch.
pub fn decode_image(bytes: &[u8], file_name: &str) -> Result<DecodedImage, AppError> {
    let format = sniff_format(bytes, file_name)?;
    let bitmap = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        AppError::InvalidImage(format!("'{file_name}' failed to decode as {format:?}: {e}"))
    })?;
    let (width, height) = bitmap.dimensions();

    Ok(DecodedImage {
        file_name: file_name.to_string(),
        format,
        dims: ImageDims::new(width, height),
        bitmap,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;

    /// Encodes a solid-color RGB image to PNG bytes in memory.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 80, 200]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([0, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_sniff_png_from_magic_bytes() {
        let bytes = png_bytes(4, 4);
        assert_eq!(sniff_format(&bytes, "a.png").unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_sniff_jpeg_from_magic_bytes() {
        let bytes = jpeg_bytes(4, 4);
        assert_eq!(sniff_format(&bytes, "a.jpg").unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_sniff_rejects_non_image_bytes() {
        let err = sniff_format(b"definitely not an image", "note.txt");
        assert!(matches!(err, Err(AppError::InvalidImage(_))));
    }

    #[test]
    fn test_sniff_rejects_unsupported_format() {
        // Valid GIF header — recognized by the sniffer but outside the
        // accepted JPEG/PNG/WEBP set.
        let gif_header = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
        let err = sniff_format(gif_header, "anim.gif");
        assert!(matches!(err, Err(AppError::InvalidImage(_))));
    }

    #[test]
    fn test_decode_reports_pixel_dimensions() {
        let bytes = png_bytes(32, 20);
        let decoded = decode_image(&bytes, "wide.png").unwrap();
        assert_eq!(decoded.dims, ImageDims::new(32, 20));
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.file_name, "wide.png");
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let mut bytes = png_bytes(32, 20);
        bytes.truncate(20); // keep the magic, drop the body
        let err = decode_image(&bytes, "broken.png");
        assert!(matches!(err, Err(AppError::InvalidImage(_))));
    }
}
