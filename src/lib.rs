//! # Raster Viewer
//!
//! Decoding, pagination and rendering core for image files, including
//! multi-page TIFF.
//!
//! A file handed to the viewer is sniffed by media type and extension, decoded
//! into an ordered sequence of RGBA8 pages, and exposed through a navigation
//! state (current page, page count, loading flag, last error). Any page can
//! then be drawn onto a surface with fit-and-center scaling.
//!
//! ## Features
//!
//! - **Multi-page TIFF**: one page per IFD, classic TIFF and BigTIFF, with
//!   per-page metadata (compression, color space, description, resolution).
//!   Bilevel, packed gray and palette frames expand to RGBA8 as well
//! - **Common web formats**: JPEG, PNG, GIF, WebP and BMP through the `image`
//!   crate
//! - **Superseded-load fencing**: a slow load can never overwrite a newer one
//! - **Notifications**: loading, loaded, page-changed and error events over a
//!   broadcast channel
//!
//! ## Architecture
//!
//! - [`io`] - File handles (in-memory and local files)
//! - [`mod@format`] - Type sniffing and the TIFF structure scanner
//! - [`decode`] - Multi-frame and native decoders producing pages
//! - [`page`] - Decoded pages and the page store
//! - [`navigation`] - Navigation state machine and pagination info
//! - [`viewer`] - The load orchestrator and viewer dispatch
//! - [`render`] - Fit-and-center layout and drawing surfaces
//! - [`config`] - Library configuration and CLI types
//!
//! ## Example
//!
//! ```rust,no_run
//! use raster_viewer::{ImageCanvas, ImageViewer, LocalFile, ViewerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let viewer = ImageViewer::new(ViewerConfig::default());
//!     let file = LocalFile::open("scan.tif").await?;
//!
//!     let summary = viewer.load_file(Some(&file)).await?;
//!     println!("{} pages", summary.page_count);
//!
//!     viewer.next_page().await?;
//!     let mut canvas = ImageCanvas::default();
//!     viewer.render_to_target(&mut canvas, None).await?;
//!     canvas.image().save("page2.png")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod format;
pub mod io;
pub mod navigation;
pub mod page;
pub mod render;
pub mod viewer;

// Re-export commonly used types
pub use config::{Cli, Command, InspectConfig, RenderConfig, ViewerConfig};
pub use decode::{decode_multi_frame, decode_native, decode_pages};
pub use error::{
    DecodeError, InputError, IoError, NavigationError, RenderError, TiffError, ViewerError,
};
pub use format::tiff::{scan_frames, FrameDescriptor};
pub use format::{is_supported, DecodePath, MediaCategory, SUPPORTED_TYPES};
pub use io::{FileInfo, FileSource, LocalFile, MemoryFile};
pub use navigation::{LoadPhase, NavigationState, PageChange, PaginationInfo};
pub use page::{PageMetadata, PageSequence, RasterPage};
pub use render::{
    compute_display_rect, render, DisplayRect, DrawContext, ImageCanvas, InfoOverlay,
    RenderOptions, RenderResult, RenderTarget,
};
pub use viewer::{FileViewer, ImageViewer, LoadResult, LoadSummary, ViewerEvent};
