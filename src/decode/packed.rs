//! Frames stored as packed sub-byte gray or as palette indices.
//!
//! The pixel decoder can step over these frames but not expand them, so
//! their strips are read straight from the file bytes using the offsets in
//! the frame's IFD. Uncompressed and PackBits strips are supported.

use std::io::Cursor;

use tiff::decoder::{ChunkType, Decoder};
use tiff::tags::Tag;

use crate::error::DecodeError;
use crate::format::tiff::{Compression, Photometric};

use super::convert::{gray_to_rgba8, packed_row_len, palette_to_rgba8};
use super::multi_frame::decoder_error;

/// Sample layout of a frame that bypasses the pixel decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PackedLayout {
    Gray { bits: u8, white_is_zero: bool },
    Palette { bits: u8 },
}

impl PackedLayout {
    const fn bits(self) -> u8 {
        match self {
            PackedLayout::Gray { bits, .. } | PackedLayout::Palette { bits } => bits,
        }
    }
}

/// Classify the decoder's current frame.
///
/// `None` means the pixel decoder handles it.
pub(super) fn packed_layout(
    decoder: &mut Decoder<Cursor<&[u8]>>,
) -> Result<Option<PackedLayout>, DecodeError> {
    let samples = decoder
        .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)
        .map_err(decoder_error)?
        .unwrap_or(1);
    if samples != 1 {
        return Ok(None);
    }

    let bits = decoder
        .find_tag_unsigned_vec::<u8>(Tag::BitsPerSample)
        .map_err(decoder_error)?
        .and_then(|bits| bits.first().copied())
        .unwrap_or(1);
    let photometric = decoder
        .find_tag_unsigned::<u16>(Tag::PhotometricInterpretation)
        .map_err(decoder_error)?
        .and_then(Photometric::from_u16);

    Ok(match (photometric, bits) {
        (Some(Photometric::Palette), 1 | 2 | 4 | 8) => Some(PackedLayout::Palette { bits }),
        (Some(Photometric::BlackIsZero), 1 | 2 | 4) => Some(PackedLayout::Gray {
            bits,
            white_is_zero: false,
        }),
        (Some(Photometric::WhiteIsZero), 1 | 2 | 4) => Some(PackedLayout::Gray {
            bits,
            white_is_zero: true,
        }),
        _ => None,
    })
}

/// Decode the decoder's current frame to RGBA8.
pub(super) fn decode_packed(
    decoder: &mut Decoder<Cursor<&[u8]>>,
    bytes: &[u8],
    layout: PackedLayout,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DecodeError> {
    let data = read_strips(decoder, bytes, layout.bits(), width, height)?;

    match layout {
        PackedLayout::Gray {
            bits,
            white_is_zero,
        } => gray_to_rgba8(bits, &data, width, height, white_is_zero),
        PackedLayout::Palette { bits } => {
            let colormap = decoder
                .get_tag_u16_vec(Tag::ColorMap)
                .map_err(decoder_error)?;
            palette_to_rgba8(bits, &data, &colormap, width, height)
        }
    }
}

/// Concatenate the frame's strips into packed rows.
fn read_strips(
    decoder: &mut Decoder<Cursor<&[u8]>>,
    bytes: &[u8],
    bits: u8,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DecodeError> {
    if decoder.get_chunk_type() == ChunkType::Tile {
        return Err(DecodeError::Decoder(format!(
            "Tiled {}-bit frames are not supported",
            bits
        )));
    }

    let code = decoder
        .find_tag_unsigned::<u16>(Tag::Compression)
        .map_err(decoder_error)?
        .unwrap_or(1);
    let compression = Compression::from_u16(code);
    if !matches!(compression, Some(Compression::None | Compression::PackBits)) {
        let name = compression.map_or("Unknown", Compression::name);
        return Err(DecodeError::Decoder(format!(
            "{} compression is not supported for {}-bit frames",
            name, bits
        )));
    }

    let offsets = decoder
        .get_tag_u64_vec(Tag::StripOffsets)
        .map_err(decoder_error)?;
    let counts = decoder
        .get_tag_u64_vec(Tag::StripByteCounts)
        .map_err(decoder_error)?;
    let rows_per_strip = decoder
        .find_tag_unsigned::<u32>(Tag::RowsPerStrip)
        .map_err(decoder_error)?
        .unwrap_or(height)
        .clamp(1, height.max(1));
    let lsb_first = decoder
        .find_tag_unsigned::<u16>(Tag::FillOrder)
        .map_err(decoder_error)?
        == Some(2);

    let row_len = packed_row_len(width, bits);
    let total = row_len * height as usize;
    let mut data = Vec::with_capacity(total);
    let mut row = 0;

    for (strip, (&offset, &count)) in offsets.iter().zip(&counts).enumerate() {
        if row >= height {
            break;
        }
        let rows = rows_per_strip.min(height - row);
        let expected = row_len * rows as usize;

        let raw = strip_bytes(bytes, offset, count).ok_or_else(|| {
            DecodeError::Decoder(format!("Strip {} lies outside the file", strip))
        })?;
        let truncated = || DecodeError::Decoder(format!("Strip {} is truncated", strip));

        if compression == Some(Compression::PackBits) {
            unpack_bits(raw, expected, &mut data).ok_or_else(truncated)?;
        } else {
            data.extend_from_slice(raw.get(..expected).ok_or_else(truncated)?);
        }
        row += rows;
    }

    if data.len() != total {
        return Err(DecodeError::PixelLength {
            expected: total,
            actual: data.len(),
        });
    }
    if lsb_first {
        data.iter_mut().for_each(|b| *b = b.reverse_bits());
    }
    Ok(data)
}

fn strip_bytes(bytes: &[u8], offset: u64, count: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let len = usize::try_from(count).ok()?;
    bytes.get(start..start.checked_add(len)?)
}

/// Append `expected` bytes of PackBits-decoded `src` to `out`.
///
/// Returns `None` if `src` runs out first.
fn unpack_bits(mut src: &[u8], expected: usize, out: &mut Vec<u8>) -> Option<()> {
    let end = out.len() + expected;

    while out.len() < end {
        let (&header, rest) = src.split_first()?;
        let n = header as i8;
        src = if n >= 0 {
            let len = n as usize + 1;
            out.extend_from_slice(rest.get(..len)?);
            &rest[len..]
        } else if n != -128 {
            let (&value, rest) = rest.split_first()?;
            let len = (1 - n as i16) as usize;
            out.extend(std::iter::repeat(value).take(len));
            rest
        } else {
            rest
        };
    }

    out.truncate(end);
    Some(())
}
