//! Render dispatch.
//!
//! Draws one [`RasterPage`] onto a [`RenderTarget`]:
//!
//! 1. Acquire the drawing context (fails with `ContextUnavailable`)
//! 2. Size the surface to the options' maximum dimensions
//! 3. Fill the background, if one is set
//! 4. Draw the page into its fit-and-center (or stretched) rectangle
//! 5. Draw the information overlay, if requested
//!
//! Rendering reads the page and never changes it, and it knows nothing about
//! navigation or loading.

mod canvas;
mod layout;

use serde::Serialize;

use crate::error::RenderError;
use crate::io::FileInfo;
use crate::navigation::PaginationInfo;
use crate::page::RasterPage;

pub use canvas::{DrawContext, ImageCanvas, RenderTarget};
pub use layout::{
    compute_display_rect, parse_color, DisplayRect, RenderOptions, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_WIDTH,
};

/// Lines of the file information overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoOverlay {
    lines: Vec<String>,
}

impl InfoOverlay {
    /// Name, size and type of the file, plus "Page x of n" when paginated.
    pub fn new(file_info: &FileInfo, pagination: Option<&PaginationInfo>) -> Self {
        let mut lines = vec![
            file_info.name.clone(),
            format!("{} \u{b7} {}", file_info.formatted_size(), file_info.media_type),
        ];
        if let Some(p) = pagination {
            lines.push(format!("Page {} of {}", p.current_page, p.total_pages));
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Draw `page` onto `target`.
///
/// The overlay is drawn only when `options.show_file_info` is set and an
/// overlay is supplied. Returns the rectangle the page was drawn into.
pub fn render(
    page: &RasterPage,
    target: &mut dyn RenderTarget,
    options: &RenderOptions,
    overlay: Option<&InfoOverlay>,
) -> Result<DisplayRect, RenderError> {
    let ctx = target.context().ok_or(RenderError::ContextUnavailable)?;

    let rect = compute_display_rect(
        page.width(),
        page.height(),
        options.max_width,
        options.max_height,
        options.preserve_aspect_ratio,
    );

    ctx.resize(options.max_width, options.max_height);
    if let Some(color) = options.background {
        ctx.fill(color);
    }
    ctx.draw_page(page, rect)?;

    if options.show_file_info {
        if let Some(overlay) = overlay {
            ctx.draw_overlay(overlay.lines())?;
        }
    }

    Ok(rect)
}

/// Structural view of a render outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<DisplayRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderResult {
    pub fn from_result<E: std::fmt::Display>(result: &Result<DisplayRect, E>) -> Self {
        match result {
            Ok(rect) => Self {
                success: true,
                rect: Some(*rect),
                error: None,
            },
            Err(err) => Self {
                success: false,
                rect: None,
                error: Some(err.to_string()),
            },
        }
    }
}
