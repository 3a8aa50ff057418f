//! TIFF structure scanner.
//!
//! Walks the IFD chain of a TIFF or BigTIFF file held in memory and produces
//! one [`FrameDescriptor`] per IFD. Pixel data is not touched here; the
//! descriptors carry dimensions and informational metadata only.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **Classic TIFF vs BigTIFF**: Classic TIFF uses 32-bit offsets, BigTIFF
//!   uses 64-bit offsets. The parser handles both transparently.
//!
//! - **IFD (Image File Directory)**: One per frame. Each IFD ends with the
//!   offset of the next one; zero terminates the chain.
//!
//! - **Inline vs offset values**: Small values are stored inline in the IFD entry,
//!   larger values are stored at an offset pointed to by the entry.

mod parser;
mod scan;
mod tags;
mod values;

pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use scan::{scan_frames, FrameDescriptor};
pub use tags::{Compression, FieldType, Photometric, TiffTag};
pub use values::ValueReader;
