//! Configuration for the viewer library and the command-line tool.
//!
//! - [`ViewerConfig`] is the library configuration. It is built explicitly
//!   and passed to [`ImageViewer::new`](crate::viewer::ImageViewer::new);
//!   there is no process-wide instance.
//! - [`Cli`] is the command-line interface of the `raster-viewer` binary,
//!   parsed with clap. Options can also be set through environment variables
//!   with the `VIEWER_` prefix.
//!
//! # Environment Variables
//!
//! - `VIEWER_MAX_WIDTH` - Render width in pixels (default: 800)
//! - `VIEWER_MAX_HEIGHT` - Render height in pixels (default: 600)
//! - `VIEWER_BACKGROUND` - Background color as `#rrggbb[aa]`
//! - `VIEWER_SHOW_INFO` - Draw the file information overlay (default: false)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use image::Rgba;

use crate::render::{parse_color, RenderOptions, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH};

// =============================================================================
// Default Values
// =============================================================================

/// Default depth of the notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Edge length of the thumbnail preset.
pub const THUMBNAIL_SIZE: u32 = 200;

// =============================================================================
// ViewerConfig
// =============================================================================

/// Library configuration for an [`ImageViewer`](crate::viewer::ImageViewer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Options used when a render call doesn't pass its own
    pub render: RenderOptions,

    /// Buffered notifications per subscriber before the oldest are dropped
    pub event_capacity: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ViewerConfig {
    /// Small square previews.
    pub fn thumbnail() -> Self {
        Self {
            render: RenderOptions::default().with_max_size(THUMBNAIL_SIZE, THUMBNAIL_SIZE),
            ..Self::default()
        }
    }

    /// Full-size display with the information overlay on.
    pub fn full_size(width: u32, height: u32) -> Self {
        Self {
            render: RenderOptions {
                show_file_info: true,
                ..RenderOptions::default().with_max_size(width, height)
            },
            ..Self::default()
        }
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.render.max_width == 0 || self.render.max_height == 0 {
            return Err(format!(
                "render size must be non-zero, got {}x{}",
                self.render.max_width, self.render.max_height
            ));
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Raster Viewer - decode, paginate and render multi-page images.
///
/// Loads JPEG, PNG, GIF, WebP, BMP and multi-page TIFF files, reports their
/// pages, and renders a page to a PNG.
#[derive(Parser, Debug, Clone)]
#[command(name = "raster-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a file and list its pages.
    Inspect(InspectConfig),

    /// Render one page of a file to a PNG.
    Render(RenderConfig),
}

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// File to load.
    pub path: PathBuf,

    /// Media type to declare instead of the one implied by the extension.
    #[arg(long)]
    pub media_type: Option<String>,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    /// File to load.
    pub path: PathBuf,

    /// Media type to declare instead of the one implied by the extension.
    #[arg(long)]
    pub media_type: Option<String>,

    /// Page to render, starting at 1.
    #[arg(short, long, default_value_t = 1)]
    pub page: i64,

    /// Output PNG path. Defaults to `<input>.page<N>.png` next to the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Width of the rendered image.
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH, env = "VIEWER_MAX_WIDTH")]
    pub max_width: u32,

    /// Height of the rendered image.
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT, env = "VIEWER_MAX_HEIGHT")]
    pub max_height: u32,

    /// Stretch the page to the full size instead of fitting and centering it.
    #[arg(long, default_value_t = false)]
    pub stretch: bool,

    /// Background color as `#rrggbb` or `#rrggbbaa`.
    #[arg(long, value_parser = parse_color, env = "VIEWER_BACKGROUND")]
    pub background: Option<Rgba<u8>>,

    /// Draw the file information overlay.
    #[arg(long, default_value_t = false, env = "VIEWER_SHOW_INFO")]
    pub info: bool,
}

impl RenderConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            preserve_aspect_ratio: !self.stretch,
            background: self.background,
            show_file_info: self.info,
        }
    }

    /// Where the PNG goes: `--output`, or next to the input.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.path.with_extension(format!("page{}.png", self.page)),
        }
    }

    /// Build and validate the viewer configuration for this command.
    pub fn viewer_config(&self) -> Result<ViewerConfig, String> {
        let config = ViewerConfig::default().with_render_options(self.render_options());
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
