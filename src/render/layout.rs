//! Render options and display-rectangle layout.

use image::Rgba;
use serde::Serialize;

/// Default drawable width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Default drawable height in pixels.
pub const DEFAULT_MAX_HEIGHT: u32 = 600;

/// How a page is drawn onto a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Width of the drawable area; the target is sized to this
    pub max_width: u32,

    /// Height of the drawable area; the target is sized to this
    pub max_height: u32,

    /// Fit-and-center when true, stretch to the full area when false
    pub preserve_aspect_ratio: bool,

    /// Fill color drawn before the page; `None` leaves the area transparent
    pub background: Option<Rgba<u8>>,

    /// Draw the file information overlay after the page
    pub show_file_info: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            preserve_aspect_ratio: true,
            background: None,
            show_file_info: false,
        }
    }
}

impl RenderOptions {
    pub fn with_max_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn with_background(mut self, color: Rgba<u8>) -> Self {
        self.background = Some(color);
        self
    }

    pub fn stretched(mut self) -> Self {
        self.preserve_aspect_ratio = false;
        self
    }
}

/// Where the page lands inside the drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl DisplayRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Compute the display rectangle for an image inside `max_width` x `max_height`.
///
/// With `preserve_aspect_ratio`, the side that limits the fit is clamped to
/// the maximum, the other side is derived from the image's aspect ratio, and
/// the result is centered. Otherwise the image fills the whole area. Derived
/// sizes and offsets are rounded to the nearest pixel.
pub fn compute_display_rect(
    image_width: u32,
    image_height: u32,
    max_width: u32,
    max_height: u32,
    preserve_aspect_ratio: bool,
) -> DisplayRect {
    let full = DisplayRect {
        x: 0,
        y: 0,
        width: max_width,
        height: max_height,
    };

    if !preserve_aspect_ratio || image_width == 0 || image_height == 0 || max_height == 0 {
        return full;
    }

    let image_ratio = image_width as f64 / image_height as f64;
    let target_ratio = max_width as f64 / max_height as f64;

    let (width, height) = if image_ratio > target_ratio {
        (max_width, (max_width as f64 / image_ratio).round() as u32)
    } else {
        ((max_height as f64 * image_ratio).round() as u32, max_height)
    };

    DisplayRect {
        x: ((max_width as f64 - width as f64) / 2.0).round() as i64,
        y: ((max_height as f64 - height as f64) / 2.0).round() as i64,
        width,
        height,
    }
}

/// Parse a hex color: `#rrggbb` or `#rrggbbaa`, leading `#` optional.
pub fn parse_color(value: &str) -> Result<Rgba<u8>, String> {
    let hex = value.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!(
            "invalid color '{}': expected #rrggbb or #rrggbbaa",
            value
        ));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
