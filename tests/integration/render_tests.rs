//! Render integration tests.
//!
//! Tests verify:
//! - The current page is fitted and centered on the canvas
//! - Render options override the viewer's configuration
//! - The information overlay reflects the navigation state
//! - Render failures leave the viewer unchanged

use image::Rgba;

use raster_viewer::{
    DisplayRect, DrawContext, ImageCanvas, ImageViewer, MemoryFile, RenderError, RenderOptions,
    RenderResult, RenderTarget, ViewerConfig,
};

use super::test_utils::{create_multi_page_tiff, three_page_tiff, BLUE, GREEN, RED};

struct DetachedSurface;

impl RenderTarget for DetachedSurface {
    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        None
    }
}

async fn viewer_with(config: ViewerConfig, data: Vec<u8>) -> ImageViewer {
    let viewer = ImageViewer::new(config);
    let file = MemoryFile::new("scan.tif", "image/tiff", data);
    viewer.load_file(Some(&file)).await.unwrap();
    viewer
}

#[tokio::test]
async fn test_render_current_page_fit_and_center() {
    let viewer = viewer_with(ViewerConfig::default(), three_page_tiff()).await;
    viewer.next_page().await.unwrap();

    let mut canvas = ImageCanvas::default();
    let rect = viewer.render_to_target(&mut canvas, None).await.unwrap();

    assert_eq!(
        rect,
        DisplayRect {
            x: 100,
            y: 0,
            width: 600,
            height: 600,
        }
    );
    assert_eq!(canvas.dimensions(), (800, 600));
    assert_eq!(*canvas.image().get_pixel(400, 300), Rgba(GREEN));
    // Left margin stays transparent without a background
    assert_eq!(*canvas.image().get_pixel(10, 300), Rgba([0, 0, 0, 0]));
    assert!(canvas.overlay_lines().is_empty());
}

#[tokio::test]
async fn test_render_options_override_config() {
    let viewer = viewer_with(ViewerConfig::thumbnail(), three_page_tiff()).await;
    viewer.jump_to_page(3).await.unwrap();

    let mut canvas = ImageCanvas::default();
    viewer.render_to_target(&mut canvas, None).await.unwrap();
    assert_eq!(canvas.dimensions(), (200, 200));

    let options = RenderOptions::default()
        .with_max_size(300, 100)
        .with_background(Rgba([9, 9, 9, 255]));
    let rect = viewer
        .render_to_target(&mut canvas, Some(options))
        .await
        .unwrap();
    assert_eq!(
        rect,
        DisplayRect {
            x: 100,
            y: 0,
            width: 100,
            height: 100,
        }
    );
    assert_eq!(*canvas.image().get_pixel(150, 50), Rgba(BLUE));
    assert_eq!(*canvas.image().get_pixel(10, 50), Rgba([9, 9, 9, 255]));
}

#[tokio::test]
async fn test_stretched_render_fills_canvas() {
    let data = create_multi_page_tiff(&[(50, 10, RED)]);
    let viewer = viewer_with(ViewerConfig::default(), data).await;

    let mut canvas = ImageCanvas::default();
    let options = RenderOptions::default().with_max_size(40, 40).stretched();
    let rect = viewer
        .render_to_target(&mut canvas, Some(options))
        .await
        .unwrap();

    assert_eq!(
        rect,
        DisplayRect {
            x: 0,
            y: 0,
            width: 40,
            height: 40,
        }
    );
    assert_eq!(*canvas.image().get_pixel(0, 0), Rgba(RED));
    assert_eq!(*canvas.image().get_pixel(39, 39), Rgba(RED));
}

#[tokio::test]
async fn test_overlay_tracks_pagination() {
    let viewer = viewer_with(ViewerConfig::full_size(640, 480), three_page_tiff()).await;
    viewer.next_page().await.unwrap();

    let mut canvas = ImageCanvas::default();
    viewer.render_to_target(&mut canvas, None).await.unwrap();

    let lines = canvas.overlay_lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "scan.tif");
    assert!(lines[1].ends_with("image/tiff"));
    assert_eq!(lines[2], "Page 2 of 3");
}

#[tokio::test]
async fn test_render_failure_leaves_state_alone() {
    let viewer = viewer_with(ViewerConfig::default(), three_page_tiff()).await;
    viewer.next_page().await.unwrap();
    let before = viewer.state().await;

    let result = viewer.render_to_target(&mut DetachedSurface, None).await;
    assert!(matches!(result, Err(RenderError::ContextUnavailable)));

    let summary = RenderResult::from_result(&result);
    assert!(!summary.success);
    assert_eq!(summary.error.as_deref(), Some("Canvas context not available"));
    assert_eq!(viewer.state().await, before);
}

#[tokio::test]
async fn test_render_after_destroy() {
    let viewer = viewer_with(ViewerConfig::default(), three_page_tiff()).await;
    viewer.destroy().await;

    let mut canvas = ImageCanvas::default();
    let result = viewer.render_to_target(&mut canvas, None).await;
    assert!(matches!(result, Err(RenderError::NoPage)));
}
