//! IFD chain walk producing one frame descriptor per IFD.

use std::collections::HashSet;

use tracing::debug;

use crate::error::TiffError;
use crate::page::PageMetadata;

use super::parser::{Ifd, TiffHeader};
use super::tags::{Compression, Photometric, TiffTag};
use super::values::ValueReader;

/// One frame as described by its IFD, before any pixel data is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Position in the IFD chain (file order)
    pub ifd_index: usize,

    /// Byte offset of the IFD
    pub offset: u64,

    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Informational tags (compression, color space, description, ...)
    pub metadata: PageMetadata,
}

/// Walk the IFD chain of an in-memory TIFF and describe every frame.
///
/// A first-IFD offset of zero yields an empty list rather than an error;
/// callers decide whether zero frames is acceptable.
///
/// # Errors
/// - Header errors from [`TiffHeader::parse`]
/// - `IfdLoop` if a next-IFD offset revisits an earlier IFD
/// - `InvalidIfdOffset` / `FileTooSmall` for IFDs outside the file
pub fn scan_frames(data: &[u8]) -> Result<Vec<FrameDescriptor>, TiffError> {
    let header = TiffHeader::parse(data, data.len() as u64)?;
    let values = ValueReader::new(data, &header);

    let mut frames = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = header.first_ifd_offset;

    while offset != 0 {
        if !visited.insert(offset) {
            return Err(TiffError::IfdLoop(offset));
        }

        let ifd = Ifd::read_at(data, offset, &header)?;
        let next_offset = ifd.next_ifd_offset;
        frames.push(describe(frames.len(), &ifd, &header, &values));

        offset = next_offset;
    }

    debug!(
        frames = frames.len(),
        bigtiff = header.is_bigtiff,
        "Scanned TIFF IFD chain"
    );

    Ok(frames)
}

fn describe(
    ifd_index: usize,
    ifd: &Ifd,
    header: &TiffHeader,
    values: &ValueReader<'_>,
) -> FrameDescriptor {
    let byte_order = header.byte_order;
    let mut metadata = PageMetadata::new();

    if let Some(code) = ifd.get_u32(TiffTag::Compression, byte_order) {
        let name = u16::try_from(code)
            .ok()
            .and_then(Compression::from_u16)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| format!("Unknown ({})", code));
        metadata.insert("compression", name);
    }

    if let Some(code) = ifd.get_u32(TiffTag::PhotometricInterpretation, byte_order) {
        let name = u16::try_from(code)
            .ok()
            .and_then(Photometric::from_u16)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| format!("Unknown ({})", code));
        metadata.insert("photometric", name);
    }

    // Per-sample arrays are usually out of line; a bad one only loses the key
    if let Some(entry) = ifd.get_entry_by_tag(TiffTag::BitsPerSample) {
        if let Ok(bits) = values.read_u64_array(entry) {
            let joined: Vec<String> = bits.iter().map(u64::to_string).collect();
            metadata.insert("bitsPerSample", joined.join(","));
        }
    }

    if let Some(samples) = ifd.get_u32(TiffTag::SamplesPerPixel, byte_order) {
        metadata.insert("samplesPerPixel", samples.to_string());
    }

    if let (Some(w), Some(h)) = (
        ifd.get_u32(TiffTag::TileWidth, byte_order),
        ifd.get_u32(TiffTag::TileLength, byte_order),
    ) {
        metadata.insert("tileSize", format!("{}x{}", w, h));
    }

    if ifd.get_u32(TiffTag::PlanarConfiguration, byte_order) == Some(2) {
        metadata.insert("planarConfiguration", "planar");
    }

    match ifd.get_u32(TiffTag::ExtraSamples, byte_order) {
        Some(1) => metadata.insert("alpha", "associated"),
        Some(2) => metadata.insert("alpha", "unassociated"),
        _ => {}
    }

    // Stored zero-based, with 0 meaning the total is unknown
    if let Some(entry) = ifd.get_entry_by_tag(TiffTag::PageNumber) {
        if let Ok(&[page, total]) = values.read_u64_array(entry).as_deref() {
            let label = if total > 0 {
                format!("{} of {}", page + 1, total)
            } else {
                (page + 1).to_string()
            };
            metadata.insert("pageNumber", label);
        }
    }

    for (tag, key) in [
        (TiffTag::ImageDescription, "description"),
        (TiffTag::Software, "software"),
        (TiffTag::DateTime, "dateTime"),
    ] {
        if let Some(text) = ifd
            .get_entry_by_tag(tag)
            .and_then(|entry| values.read_string(entry).ok())
            .filter(|text| !text.is_empty())
        {
            metadata.insert(key, text);
        }
    }

    if let Some((x, y)) = read_resolution(ifd, values) {
        let unit = match ifd.get_u32(TiffTag::ResolutionUnit, byte_order) {
            Some(3) => " dpcm",
            Some(1) => "",
            _ => " dpi",
        };
        metadata.insert("resolution", format!("{}x{}{}", x, y, unit));
    }

    FrameDescriptor {
        ifd_index,
        offset: ifd.offset,
        width: ifd.image_width(byte_order),
        height: ifd.image_height(byte_order),
        metadata,
    }
}

fn read_resolution(ifd: &Ifd, values: &ValueReader<'_>) -> Option<(u32, u32)> {
    let rational = |tag: TiffTag| {
        let (num, den) = values.read_rational(ifd.get_entry_by_tag(tag)?).ok()?;
        (den != 0).then(|| ((num as f64) / (den as f64)).round() as u32)
    };
    Some((rational(TiffTag::XResolution)?, rational(TiffTag::YResolution)?))
}

// =============================================================================
// Tests
// =============================================================================
