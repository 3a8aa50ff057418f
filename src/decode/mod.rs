//! Turning file bytes into raster pages.
//!
//! Two paths exist, chosen by [`DecodePath`]:
//!
//! - [`decode_multi_frame`]: TIFF containers, one page per IFD
//! - [`decode_native`]: everything else, exactly one page
//!
//! Both are synchronous and CPU-bound. [`decode_pages`] runs the chosen path
//! on tokio's blocking pool so callers on the async runtime don't stall.

mod convert;
mod multi_frame;
mod native;
mod packed;

use bytes::Bytes;

use crate::error::DecodeError;
use crate::format::DecodePath;
use crate::page::RasterPage;

pub use convert::{gray_to_rgba8, palette_to_rgba8, to_rgba8};
pub use multi_frame::decode_multi_frame;
pub use native::decode_native;

/// Decode `bytes` along `path` on the blocking pool.
///
/// The bytes are moved into the task; every buffer created during the decode
/// is owned by that task and dropped when it ends, success or failure.
pub async fn decode_pages(path: DecodePath, bytes: Bytes) -> Result<Vec<RasterPage>, DecodeError> {
    tokio::task::spawn_blocking(move || match path {
        DecodePath::MultiFrame => decode_multi_frame(&bytes),
        DecodePath::Native => decode_native(&bytes).map(|page| vec![page]),
    })
    .await
    .map_err(|e| DecodeError::Task(e.to_string()))?
}
