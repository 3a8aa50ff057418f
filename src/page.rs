//! Decoded raster pages and the page store.
//!
//! A [`RasterPage`] is one decoded frame: dimensions plus an RGBA8 buffer of
//! exactly `width * height * 4` bytes. Pages are immutable once built; the
//! pixel buffer is a [`Bytes`], so handing pages out clones a reference count,
//! not the pixels.
//!
//! [`PageSequence`] holds the pages of the currently loaded file. It is a pure
//! container: out-of-range lookups return `None`, and bounds for navigation
//! are enforced elsewhere.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

// =============================================================================
// PageMetadata
// =============================================================================

/// Informational key/value pairs carried from the decoder (compression,
/// color space, description, ...). Never consulted for navigation or
/// rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageMetadata(BTreeMap<String, String>);

impl PageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// RasterPage
// =============================================================================

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    index: usize,
    width: u32,
    height: u32,
    pixels: Bytes,
    metadata: PageMetadata,
}

impl RasterPage {
    /// Build a page, checking that `pixels` holds exactly `width * height * 4` bytes.
    ///
    /// # Errors
    /// `PixelLength` if the buffer size does not match the dimensions
    /// (including zero-sized dimensions, which cannot hold a frame).
    pub fn new(
        index: usize,
        width: u32,
        height: u32,
        pixels: impl Into<Bytes>,
        metadata: PageMetadata,
    ) -> Result<Self, DecodeError> {
        let pixels = pixels.into();
        let expected = rgba_len(width, height).unwrap_or(usize::MAX);

        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(DecodeError::PixelLength {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            index,
            width,
            height,
            pixels,
            metadata,
        })
    }

    /// Zero-based position within the file's page sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Interleaved RGBA8, row-major, top to bottom.
    pub fn pixels(&self) -> &Bytes {
        &self.pixels
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    /// The same page at a different position in its sequence.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// Byte length of an RGBA8 buffer, `None` on overflow.
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

// =============================================================================
// PageSequence
// =============================================================================

/// The ordered pages of the currently loaded file.
///
/// Loading replaces the whole sequence; there is no per-page mutation. The
/// pages sit behind an `Arc`, so a snapshot taken with [`all`](Self::all)
/// stays valid after the store is replaced.
#[derive(Debug, Clone)]
pub struct PageSequence {
    pages: Arc<[RasterPage]>,
}

impl Default for PageSequence {
    fn default() -> Self {
        Self {
            pages: Arc::from(Vec::new()),
        }
    }
}

impl PageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `pages`.
    ///
    /// Page indices are rewritten to match their position, so the sequence
    /// is always contiguous from zero.
    pub fn load(&mut self, pages: Vec<RasterPage>) {
        self.pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| if page.index == i { page } else { page.with_index(i) })
            .collect();
    }

    /// The page at `index`, or `None` outside `[0, len)`.
    pub fn get(&self, index: usize) -> Option<&RasterPage> {
        self.pages.get(index)
    }

    /// Read-only view of every page.
    pub fn all(&self) -> Arc<[RasterPage]> {
        Arc::clone(&self.pages)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
