//! Single-frame decoding through the `image` crate.
//!
//! Covers the common web raster formats (JPEG, PNG, GIF, WebP, BMP). Animated
//! GIF and WebP yield their first frame only. Formats the decoder can't
//! handle, SVG included, fail with [`DecodeError::ImageLoad`].

use std::io::Cursor;

use image::ImageReader;
use tracing::debug;

use crate::error::DecodeError;
use crate::page::{PageMetadata, RasterPage};

/// Decode a single-frame raster into one RGBA8 page at index 0.
///
/// The decoder's own error is logged and replaced by the fixed
/// "Failed to load image" message.
pub fn decode_native(bytes: &[u8]) -> Result<RasterPage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| {
            debug!(error = %e, "Could not sniff image format");
            DecodeError::ImageLoad
        })?;

    let format = reader.format();
    let image = reader.decode().map_err(|e| {
        debug!(error = %e, ?format, "Native image decode failed");
        DecodeError::ImageLoad
    })?;

    let mut metadata = PageMetadata::new();
    if let Some(format) = format {
        metadata.insert("format", format!("{:?}", format));
    }
    metadata.insert("colorType", format!("{:?}", image.color()));

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    RasterPage::new(0, width, height, rgba.into_raw(), metadata)
}
