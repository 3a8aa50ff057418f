//! File format handling.
//!
//! - [`detect`]: media-type and extension sniffing that decides whether a file
//!   is viewable and which decode path applies
//! - [`tiff`]: structural scan of TIFF/BigTIFF files into per-frame descriptors

pub mod detect;
pub mod tiff;

pub use detect::{
    has_multi_frame_extension, is_multi_frame, is_supported, media_type_from_path, DecodePath,
    MediaCategory, GENERIC_MEDIA_TYPE, SUPPORTED_TYPES,
};
