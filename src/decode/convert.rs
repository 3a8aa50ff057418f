//! Conversion of decoded TIFF samples to interleaved RGBA8.
//!
//! The pixel decoder hands back samples in the frame's native layout and bit
//! depth. Pages always carry RGBA8, so every frame goes through here. 16-bit
//! samples keep their high byte.
//!
//! Samples narrower than a byte arrive packed, most significant bits first,
//! with every row starting on a byte boundary. Those are expanded by
//! [`gray_to_rgba8`] and [`palette_to_rgba8`].

use tiff::decoder::DecodingResult;
use tiff::ColorType;

use crate::error::DecodeError;

/// Channel layouts that have an RGBA8 conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    Cmyk,
}

impl Layout {
    const fn channels(self) -> usize {
        match self {
            Layout::Gray => 1,
            Layout::GrayAlpha => 2,
            Layout::Rgb => 3,
            Layout::Rgba | Layout::Cmyk => 4,
        }
    }

    fn from_color_type(color_type: ColorType) -> Option<(Self, u8)> {
        match color_type {
            ColorType::Gray(bits) => Some((Layout::Gray, bits)),
            ColorType::GrayA(bits) => Some((Layout::GrayAlpha, bits)),
            ColorType::RGB(bits) => Some((Layout::Rgb, bits)),
            ColorType::RGBA(bits) => Some((Layout::Rgba, bits)),
            ColorType::CMYK(bits) => Some((Layout::Cmyk, bits)),
            _ => None,
        }
    }
}

/// Convert one decoded frame to RGBA8.
///
/// # Errors
/// - `UnsupportedColor` for layouts or bit depths without a conversion
/// - `PixelLength` if the sample count does not match the dimensions
pub fn to_rgba8(
    color_type: ColorType,
    samples: DecodingResult,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DecodeError> {
    let unsupported = || DecodeError::UnsupportedColor(format!("{:?}", color_type));

    let (layout, bits) = Layout::from_color_type(color_type).ok_or_else(unsupported)?;

    let samples: Vec<u8> = match (bits, samples) {
        (1 | 2 | 4, DecodingResult::U8(samples)) if layout == Layout::Gray => {
            // The pixel decoder has already flipped WhiteIsZero data
            return gray_to_rgba8(bits, &samples, width, height, false);
        }
        (8, DecodingResult::U8(samples)) => samples,
        (16, DecodingResult::U16(samples)) => samples.iter().map(|&s| (s >> 8) as u8).collect(),
        _ => return Err(unsupported()),
    };

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(DecodeError::PixelLength {
            expected: usize::MAX,
            actual: samples.len(),
        })?;
    let expected = pixel_count.saturating_mul(layout.channels());
    if samples.len() != expected {
        return Err(DecodeError::PixelLength {
            expected,
            actual: samples.len(),
        });
    }

    if layout == Layout::Rgba {
        return Ok(samples);
    }

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for px in samples.chunks_exact(layout.channels()) {
        let out = match layout {
            Layout::Gray => [px[0], px[0], px[0], 255],
            Layout::GrayAlpha => [px[0], px[0], px[0], px[1]],
            Layout::Rgb => [px[0], px[1], px[2], 255],
            Layout::Rgba => [px[0], px[1], px[2], px[3]],
            Layout::Cmyk => {
                let k = 255 - px[3] as u16;
                let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
                [channel(px[0]), channel(px[1]), channel(px[2]), 255]
            }
        };
        rgba.extend_from_slice(&out);
    }

    Ok(rgba)
}

/// Bytes in one packed row of `width` samples.
pub(super) fn packed_row_len(width: u32, bits: u8) -> usize {
    (width as usize * bits as usize + 7) / 8
}

/// Sample `x` of a packed row.
fn packed_sample(row: &[u8], x: usize, bits: u8) -> u8 {
    let bit = x * bits as usize;
    let shift = 8 - bits as usize - bit % 8;
    (row[bit / 8] >> shift) & (0xFF >> (8 - bits))
}

/// Validate a packed buffer and return its row length.
///
/// Buffers longer than the packed image are accepted; only the leading rows
/// are read.
fn packed_rows(
    kind: &str,
    bits: u8,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<usize, DecodeError> {
    if !matches!(bits, 1 | 2 | 4 | 8) {
        return Err(DecodeError::UnsupportedColor(format!("{}({})", kind, bits)));
    }

    let row_len = packed_row_len(width, bits);
    let expected = row_len.saturating_mul(height as usize);
    if data.len() < expected {
        return Err(DecodeError::PixelLength {
            expected,
            actual: data.len(),
        });
    }
    Ok(row_len)
}

/// Expand packed gray samples of 1, 2, 4 or 8 bits to RGBA8.
///
/// Sample values are scaled so the largest one maps to 255. With
/// `white_is_zero` the scale is flipped.
///
/// # Errors
/// - `UnsupportedColor` for any other bit depth
/// - `PixelLength` if `data` is shorter than the packed rows
pub fn gray_to_rgba8(
    bits: u8,
    data: &[u8],
    width: u32,
    height: u32,
    white_is_zero: bool,
) -> Result<Vec<u8>, DecodeError> {
    let row_len = packed_rows("Gray", bits, data, width, height)?;
    if row_len == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let max = (1u16 << bits) - 1;
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for row in data.chunks_exact(row_len).take(height as usize) {
        for x in 0..width as usize {
            let level = (packed_sample(row, x, bits) as u16 * 255 / max) as u8;
            let v = if white_is_zero { 255 - level } else { level };
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Ok(rgba)
}

/// Expand packed palette indices through a TIFF color map.
///
/// `colormap` holds every red value, then every green, then every blue, with
/// `2^bits` 16-bit entries each. Each entry keeps its high byte.
///
/// # Errors
/// - `UnsupportedColor` for bit depths other than 1, 2, 4 or 8, or a color
///   map of the wrong length
/// - `PixelLength` if `data` is shorter than the packed rows
pub fn palette_to_rgba8(
    bits: u8,
    data: &[u8],
    colormap: &[u16],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DecodeError> {
    let row_len = packed_rows("Palette", bits, data, width, height)?;

    let entries = 1usize << bits;
    if colormap.len() != entries * 3 {
        return Err(DecodeError::UnsupportedColor(format!(
            "Palette({}) with {} color map values",
            bits,
            colormap.len()
        )));
    }
    if row_len == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let (reds, rest) = colormap.split_at(entries);
    let (greens, blues) = rest.split_at(entries);

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for row in data.chunks_exact(row_len).take(height as usize) {
        for x in 0..width as usize {
            let i = packed_sample(row, x, bits) as usize;
            rgba.extend_from_slice(&[
                (reds[i] >> 8) as u8,
                (greens[i] >> 8) as u8,
                (blues[i] >> 8) as u8,
                255,
            ]);
        }
    }
    Ok(rgba)
}
