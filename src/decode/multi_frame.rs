//! Multi-frame TIFF decoding.
//!
//! The IFD chain is scanned first to get frame descriptors and their
//! metadata. Pixel data then comes from the `tiff` crate's decoder, which
//! steps through the same chain in the same order, so descriptor `i` and
//! decoded image `i` describe the same frame. Palette and sub-byte gray
//! frames are expanded from their raw strips instead.

use std::io::Cursor;

use tiff::decoder::Decoder;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::format::tiff::{scan_frames, FrameDescriptor};
use crate::page::RasterPage;

use super::convert::to_rgba8;
use super::packed::{decode_packed, packed_layout};

pub(super) fn decoder_error(err: tiff::TiffError) -> DecodeError {
    DecodeError::Decoder(err.to_string())
}

/// Decode every frame of a multi-frame container into RGBA8 pages.
///
/// Frames come back in file order with `index` equal to their position.
/// Decoding is all-or-nothing: any failing frame fails the whole call.
///
/// # Errors
/// - `NoPages` if the container holds zero frames
/// - `Tiff` if the IFD chain is malformed
/// - `Decoder` with the pixel decoder's message if a frame fails to decode
/// - `UnsupportedColor` / `PixelLength` if a frame can't become RGBA8
pub fn decode_multi_frame(bytes: &[u8]) -> Result<Vec<RasterPage>, DecodeError> {
    let descriptors = scan_frames(bytes)?;
    if descriptors.is_empty() {
        return Err(DecodeError::NoPages);
    }

    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(decoder_error)?;
    let mut pages = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        if descriptor.ifd_index > 0 {
            if !decoder.more_images() {
                return Err(DecodeError::Decoder(format!(
                    "Frame {} could not be read",
                    descriptor.ifd_index
                )));
            }
            decoder.next_image().map_err(decoder_error)?;
        }

        pages.push(decode_frame(&mut decoder, bytes, descriptor)?);
    }

    debug!(pages = pages.len(), "Decoded multi-frame container");
    Ok(pages)
}

fn decode_frame(
    decoder: &mut Decoder<Cursor<&[u8]>>,
    bytes: &[u8],
    descriptor: FrameDescriptor,
) -> Result<RasterPage, DecodeError> {
    let (width, height) = decoder.dimensions().map_err(decoder_error)?;

    if descriptor.width.map_or(false, |w| w != width)
        || descriptor.height.map_or(false, |h| h != height)
    {
        warn!(
            frame = descriptor.ifd_index,
            scanned_width = ?descriptor.width,
            scanned_height = ?descriptor.height,
            width,
            height,
            "Frame dimensions differ between scan and decode"
        );
    }

    let rgba = match packed_layout(decoder)? {
        Some(layout) => {
            debug!(frame = descriptor.ifd_index, ?layout, "Expanding packed frame");
            decode_packed(decoder, bytes, layout, width, height)?
        }
        None => {
            let color_type = decoder.colortype().map_err(decoder_error)?;
            let samples = decoder.read_image().map_err(decoder_error)?;
            to_rgba8(color_type, samples, width, height)?
        }
    };

    RasterPage::new(descriptor.ifd_index, width, height, rgba, descriptor.metadata)
}
