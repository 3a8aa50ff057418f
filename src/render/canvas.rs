//! Drawing surfaces.
//!
//! Rendering talks to a [`RenderTarget`], which may or may not be able to
//! hand out a [`DrawContext`]. [`ImageCanvas`] is the in-memory target used
//! by the CLI and tests; hosts with their own surface implement the traits.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::RenderError;
use crate::page::RasterPage;

use super::layout::DisplayRect;

/// Height of one overlay text line, in pixels.
const OVERLAY_LINE_HEIGHT: u32 = 16;

/// Padding around the overlay text block, in pixels.
const OVERLAY_PADDING: u32 = 8;

/// Something that can be drawn on.
pub trait RenderTarget {
    /// Acquire the drawing context, or `None` if the surface is unavailable.
    fn context(&mut self) -> Option<&mut dyn DrawContext>;
}

/// Drawing operations used by the render dispatch, in call order.
pub trait DrawContext {
    /// Resize the surface. Previous contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Fill the whole surface with `color`.
    fn fill(&mut self, color: Rgba<u8>);

    /// Draw `page` scaled into `rect`, blending over what is already there.
    fn draw_page(&mut self, page: &RasterPage, rect: DisplayRect) -> Result<(), RenderError>;

    /// Draw the information overlay, one entry per line.
    fn draw_overlay(&mut self, lines: &[String]) -> Result<(), RenderError>;
}

// =============================================================================
// ImageCanvas
// =============================================================================

/// An in-memory RGBA surface.
///
/// The overlay is drawn as a translucent band along the bottom edge; the
/// text itself is kept in [`overlay_lines`](Self::overlay_lines) for the host
/// to rasterize, since no font is bundled.
#[derive(Debug, Clone)]
pub struct ImageCanvas {
    image: RgbaImage,
    overlay: Vec<String>,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            overlay: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Text lines of the last overlay drawn.
    pub fn overlay_lines(&self) -> &[String] {
        &self.overlay
    }
}

impl Default for ImageCanvas {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RenderTarget for ImageCanvas {
    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        Some(self)
    }
}

impl DrawContext for ImageCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
        self.overlay.clear();
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_page(&mut self, page: &RasterPage, rect: DisplayRect) -> Result<(), RenderError> {
        if rect.is_empty() {
            return Ok(());
        }

        let source = RgbaImage::from_raw(page.width(), page.height(), page.pixels().to_vec())
            .ok_or_else(|| {
                RenderError::Draw(format!(
                    "page {} buffer does not match {}x{}",
                    page.index(),
                    page.width(),
                    page.height()
                ))
            })?;

        let scaled = if (rect.width, rect.height) == source.dimensions() {
            source
        } else {
            imageops::resize(&source, rect.width, rect.height, FilterType::Triangle)
        };

        imageops::overlay(&mut self.image, &scaled, rect.x, rect.y);
        Ok(())
    }

    fn draw_overlay(&mut self, lines: &[String]) -> Result<(), RenderError> {
        self.overlay = lines.to_vec();
        if lines.is_empty() {
            return Ok(());
        }

        let (width, height) = self.image.dimensions();
        let band_height =
            (lines.len() as u32 * OVERLAY_LINE_HEIGHT + 2 * OVERLAY_PADDING).min(height);
        let band = RgbaImage::from_pixel(width, band_height, Rgba([0, 0, 0, 160]));
        imageops::overlay(&mut self.image, &band, 0, (height - band_height) as i64);
        Ok(())
    }
}
