//! File type detection.
//!
//! Decides whether a file can be viewed at all, which media category it
//! belongs to, and which decode path handles it. Two signals are combined:
//!
//! - **Declared media type**: whatever the file handle reports. Browsers and
//!   servers frequently report `application/octet-stream` (or nothing) for
//!   TIFF files, so this is not trusted alone.
//! - **File extension**: `.tif`/`.tiff` routes to the multi-frame path even
//!   when the declared type is generic or wrong.
//!
//! Frame count never influences the path: a single-page TIFF still goes
//! through the multi-frame decoder.

/// Media types accepted by the image viewer.
pub const SUPPORTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/bmp",
    "image/tiff",
    "image/tif",
];

/// Declared media types of the multi-frame container.
const MULTI_FRAME_TYPES: &[&str] = &["image/tiff", "image/tif"];

/// Extensions of the multi-frame container (compared case-insensitively).
const MULTI_FRAME_EXTENSIONS: &[&str] = &[".tif", ".tiff"];

/// Media type reported for extensions we don't know.
pub const GENERIC_MEDIA_TYPE: &str = "application/octet-stream";

// =============================================================================
// MediaCategory
// =============================================================================

/// Broad category of a file, used to pick a viewer implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaCategory {
    /// Classify a file from its declared media type and name.
    ///
    /// Returns `None` when nothing about the file is recognizable.
    pub fn detect(media_type: &str, name: &str) -> Option<Self> {
        if has_multi_frame_extension(name) {
            return Some(MediaCategory::Image);
        }

        let media_type = normalize_media_type(media_type);
        let (top, sub) = media_type.split_once('/')?;
        match top {
            "image" => Some(MediaCategory::Image),
            "video" => Some(MediaCategory::Video),
            "audio" => Some(MediaCategory::Audio),
            "text" if sub != "plain" => Some(MediaCategory::Document),
            "application" if matches!(sub, "pdf" | "msword") => Some(MediaCategory::Document),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::Audio => "audio",
            MediaCategory::Document => "document",
        }
    }
}

// =============================================================================
// DecodePath
// =============================================================================

/// Which decoder turns the file into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    /// Multi-frame container, one page per IFD
    MultiFrame,

    /// Single-frame raster through the general image decoder
    Native,
}

impl DecodePath {
    /// Select the decode path for a file.
    pub fn select(media_type: &str, name: &str) -> Self {
        if is_multi_frame(media_type, name) {
            DecodePath::MultiFrame
        } else {
            DecodePath::Native
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DecodePath::MultiFrame => "multi-frame",
            DecodePath::Native => "native",
        }
    }
}

// =============================================================================
// Sniffing
// =============================================================================

/// Lowercase a media type and drop any parameters (`; charset=...`).
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check whether a file name carries a multi-frame container extension.
pub fn has_multi_frame_extension(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    MULTI_FRAME_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Check whether a file should be decoded as a multi-frame container.
pub fn is_multi_frame(media_type: &str, name: &str) -> bool {
    let media_type = normalize_media_type(media_type);
    MULTI_FRAME_TYPES.contains(&media_type.as_str()) || has_multi_frame_extension(name)
}

/// Check whether the image viewer accepts a file.
///
/// Any declared `image/*` type is accepted; otherwise the multi-frame
/// extension is the fallback.
pub fn is_supported(media_type: &str, name: &str) -> bool {
    normalize_media_type(media_type).starts_with("image/") || has_multi_frame_extension(name)
}

/// Guess a media type from a file name's extension.
pub fn media_type_from_path(name: &str) -> &'static str {
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return GENERIC_MEDIA_TYPE,
    };

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => GENERIC_MEDIA_TYPE,
    }
}

// =============================================================================
// Tests
// =============================================================================
