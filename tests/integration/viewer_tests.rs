//! Viewer integration tests.
//!
//! Tests verify:
//! - A multi-page TIFF loads into one page per frame
//! - Navigation clamps at both ends and reports pagination
//! - Input errors leave state untouched and emit nothing
//! - A slow load cannot overwrite a newer one
//! - Teardown resets everything

use std::sync::Arc;
use std::time::Duration;

use raster_viewer::{
    DecodeError, FileViewer, ImageViewer, InputError, LoadPhase, LoadResult, MediaCategory,
    MemoryFile, NavigationError, PageChange, PaginationInfo, ViewerConfig, ViewerError,
    ViewerEvent,
};
use tokio::sync::broadcast::error::TryRecvError;

use super::test_utils::{
    create_png, create_zero_frame_tiff, three_page_tiff, GatedFile, BLUE, GREEN, RED,
};

async fn loaded_viewer() -> ImageViewer {
    let viewer = ImageViewer::default();
    let file = MemoryFile::new("scan.tif", "image/tiff", three_page_tiff());
    viewer.load_file(Some(&file)).await.unwrap();
    viewer
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_multi_page_tiff() {
    let viewer = ImageViewer::default();
    let file = MemoryFile::new("scan.tif", "image/tiff", three_page_tiff());

    let summary = viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(summary.page_count, 3);
    assert_eq!(summary.file_info.name, "scan.tif");
    assert_eq!(summary.file_info.media_type, "image/tiff");

    let state = viewer.state().await.unwrap();
    assert_eq!(state.current_page(), 0);
    assert_eq!(state.total_pages(), 3);
    assert!(!state.is_loading());
    assert_eq!(state.error(), None);
    assert_eq!(state.phase(), LoadPhase::Ready);

    let pages = viewer.pages().await;
    assert_eq!(pages.len(), 3);
    for (i, (page, color)) in pages.iter().zip([RED, GREEN, BLUE]).enumerate() {
        assert_eq!(page.index(), i);
        assert_eq!(page.dimensions(), (100, 100));
        assert_eq!(page.pixels().len(), 100 * 100 * 4);
        assert_eq!(&page.pixels()[..4], &color);
    }

    assert_eq!(
        viewer.pagination_info().await,
        Some(PaginationInfo {
            current_page: 1,
            total_pages: 3,
            can_go_next: true,
            can_go_previous: false,
        })
    );
}

#[tokio::test]
async fn test_tif_with_generic_media_type_is_accepted() {
    let viewer = ImageViewer::default();
    let file = MemoryFile::new("scan.tif", "application/octet-stream", three_page_tiff());

    let summary = viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(summary.page_count, 3);
}

#[tokio::test]
async fn test_single_frame_file_has_no_pagination() {
    let viewer = ImageViewer::default();
    let file = MemoryFile::new("photo.png", "image/png", create_png(40, 30, RED));

    let summary = viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(summary.page_count, 1);
    assert!(viewer.pagination_info().await.is_none());
    assert_eq!(viewer.next_page().await, Ok(None));
}

#[tokio::test]
async fn test_zero_frame_tiff_fails() {
    let viewer = ImageViewer::default();
    let file = MemoryFile::new("empty.tif", "image/tiff", create_zero_frame_tiff());

    let err = viewer.load_file(Some(&file)).await.unwrap_err();
    assert!(matches!(err, ViewerError::Decode(DecodeError::NoPages)));
    assert_eq!(err.to_string(), "No valid TIFF pages found");

    let state = viewer.state().await.unwrap();
    assert_eq!(state.phase(), LoadPhase::Failed);
    assert_eq!(state.error(), Some("No valid TIFF pages found"));
    assert_eq!(state.total_pages(), 0);
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_truncated_tiff_fails_and_clears_previous_pages() {
    let viewer = loaded_viewer().await;

    let mut data = three_page_tiff();
    data.truncate(64);
    let file = MemoryFile::new("cut.tif", "image/tiff", data);

    let result = LoadResult::from(viewer.load_file(Some(&file)).await);
    assert!(!result.success);
    assert!(result.error.is_some());

    assert!(viewer.pages().await.is_empty());
    assert!(viewer.current_page().await.is_none());
    assert_eq!(viewer.state().await.unwrap().total_pages(), 0);
}

#[tokio::test]
async fn test_single_page_file_replaces_multi_page_file() {
    let viewer = loaded_viewer().await;
    viewer.jump_to_page(3).await.unwrap();
    assert_eq!(viewer.pages().await.len(), 3);

    let file = MemoryFile::new("photo.png", "image/png", create_png(7, 5, GREEN));
    let summary = viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(summary.page_count, 1);

    assert_eq!(viewer.pagination_info().await, None);
    let pages = viewer.pages().await;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].dimensions(), (7, 5));
    assert_eq!(&pages[0].pixels()[..4], &GREEN);

    let state = viewer.state().await.unwrap();
    assert_eq!((state.current_page(), state.total_pages()), (0, 1));
    assert_eq!(
        state.file_info().map(|info| info.name.as_str()),
        Some("photo.png")
    );

    // Nothing from the TIFF is reachable any more
    assert_eq!(viewer.current_page().await.unwrap().dimensions(), (7, 5));
    assert_eq!(viewer.jump_to_page(3).await, Ok(None));
    assert_eq!(viewer.jump_to_page(2).await, Ok(None));
    assert_eq!(viewer.next_page().await, Ok(None));
    assert!(viewer.page(1).await.is_none());
    assert!(viewer.page(2).await.is_none());
    assert_eq!(viewer.current_page().await.unwrap().dimensions(), (7, 5));
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn test_next_and_previous_clamp() {
    let viewer = loaded_viewer().await;

    assert_eq!(viewer.previous_page().await, Ok(None));

    let change = viewer.next_page().await.unwrap();
    assert_eq!(
        change,
        Some(PageChange {
            current_page: 1,
            previous_page: 0,
            total_pages: 3,
        })
    );
    viewer.next_page().await.unwrap();
    assert_eq!(viewer.next_page().await, Ok(None));

    assert_eq!(
        viewer.pagination_info().await,
        Some(PaginationInfo {
            current_page: 3,
            total_pages: 3,
            can_go_next: false,
            can_go_previous: true,
        })
    );

    viewer.previous_page().await.unwrap();
    assert_eq!(
        viewer.pagination_info().await,
        Some(PaginationInfo {
            current_page: 2,
            total_pages: 3,
            can_go_next: true,
            can_go_previous: true,
        })
    );
    assert_eq!(
        viewer.current_page().await.map(|p| p.pixels()[..4].to_vec()),
        Some(GREEN.to_vec())
    );
}

#[tokio::test]
async fn test_jump_to_page_ignores_out_of_range() {
    let viewer = loaded_viewer().await;

    for page_number in [0, -1, 4, i64::MAX] {
        assert_eq!(viewer.jump_to_page(page_number).await, Ok(None));
    }
    assert_eq!(viewer.state().await.unwrap().current_page(), 0);

    let change = viewer.jump_to_page(3).await.unwrap().unwrap();
    assert_eq!(change.current_page, 2);
    assert_eq!(viewer.navigate_to_page(2).await, Ok(None));
    assert_eq!(viewer.navigate_to_page(9).await, Ok(None));
}

#[tokio::test]
async fn test_navigation_before_any_load() {
    let viewer = ImageViewer::default();
    assert_eq!(viewer.previous_page().await, Err(NavigationError::NotLoaded));
    assert_eq!(
        viewer.navigate_to_page(0).await,
        Err(NavigationError::NotLoaded)
    );
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_events_follow_state_transitions() {
    let viewer = ImageViewer::default();
    let mut events = viewer.subscribe();

    let file = MemoryFile::new("scan.tif", "image/tiff", three_page_tiff());
    viewer.load_file(Some(&file)).await.unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        ViewerEvent::LoadingStart { file_info } if file_info.name == "scan.tif"
    ));
    assert_eq!(events.recv().await.unwrap(), ViewerEvent::LoadingEnd);
    assert!(matches!(
        events.recv().await.unwrap(),
        ViewerEvent::Loaded { page_count: 3, .. }
    ));

    viewer.next_page().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        ViewerEvent::PageChanged(PageChange {
            current_page: 1,
            previous_page: 0,
            total_pages: 3,
        })
    );

    // Clamped moves change nothing and say nothing
    viewer.jump_to_page(2).await.unwrap();
    viewer.jump_to_page(42).await.unwrap();
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_failed_load_emits_error() {
    let viewer = ImageViewer::default();
    let mut events = viewer.subscribe();

    let file = MemoryFile::new("empty.tif", "image/tiff", create_zero_frame_tiff());
    viewer.load_file(Some(&file)).await.unwrap_err();

    assert!(matches!(
        events.recv().await.unwrap(),
        ViewerEvent::LoadingStart { .. }
    ));
    assert_eq!(events.recv().await.unwrap(), ViewerEvent::LoadingEnd);
    assert_eq!(
        events.recv().await.unwrap(),
        ViewerEvent::Error {
            message: "No valid TIFF pages found".to_string()
        }
    );
}

// =============================================================================
// Input Validation
// =============================================================================

#[tokio::test]
async fn test_unsupported_type_has_no_side_effects() {
    let viewer = loaded_viewer().await;
    viewer.next_page().await.unwrap();
    let before = viewer.state().await;
    let mut events = viewer.subscribe();

    let text = MemoryFile::new("notes.txt", "text/plain", b"hello".to_vec());
    let err = viewer.load_file(Some(&text)).await.unwrap_err();
    assert!(matches!(
        err,
        ViewerError::Input(InputError::UnsupportedType { ref media_type }) if media_type == "text/plain"
    ));

    assert_eq!(viewer.state().await, before);
    assert_eq!(viewer.page_count().await, 3);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_missing_file_has_no_side_effects() {
    let viewer = loaded_viewer().await;
    let mut events = viewer.subscribe();

    let result = LoadResult::from(viewer.load_file(None).await);
    assert_eq!(result.error.as_deref(), Some("File is required"));
    assert_eq!(viewer.page_count().await, 3);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_file_viewer_dispatch() {
    let file = MemoryFile::new("scan.tiff", "", three_page_tiff());
    let viewer = FileViewer::for_file(&file, ViewerConfig::default()).unwrap();
    assert_eq!(viewer.category(), MediaCategory::Image);

    let summary = viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(summary.page_count, 3);

    viewer.destroy().await;
    let image = viewer.as_image().unwrap();
    assert_eq!(image.page_count().await, 0);
}

// =============================================================================
// Superseded Loads and Teardown
// =============================================================================

#[tokio::test]
async fn test_slow_load_does_not_overwrite_newer_load() {
    let viewer = Arc::new(ImageViewer::default());
    let mut events = viewer.subscribe();

    let slow = GatedFile::new("slow.tif", "image/tiff", three_page_tiff());
    let gate = slow.gate();
    let first = tokio::spawn({
        let viewer = viewer.clone();
        async move { viewer.load_file(Some(&slow)).await }
    });

    // Wait for the first load to take its generation
    assert!(matches!(
        events.recv().await.unwrap(),
        ViewerEvent::LoadingStart { ref file_info } if file_info.name == "slow.tif"
    ));

    let fast = MemoryFile::new("fast.png", "image/png", create_png(10, 10, BLUE));
    let summary = viewer.load_file(Some(&fast)).await.unwrap();
    assert_eq!(summary.page_count, 1);

    gate.notify_one();
    let err = tokio::time::timeout(Duration::from_secs(10), first)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ViewerError::Superseded));

    let state = viewer.state().await.unwrap();
    assert_eq!(state.total_pages(), 1);
    assert_eq!(
        state.file_info().map(|info| info.name.as_str()),
        Some("fast.png")
    );
    assert_eq!(viewer.page_count().await, 1);

    // Each load's start has exactly one matching end
    let mut starts = 1;
    let mut ends = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            ViewerEvent::LoadingStart { .. } => starts += 1,
            ViewerEvent::LoadingEnd => ends += 1,
            _ => {}
        }
    }
    assert_eq!((starts, ends), (2, 2));
}

#[tokio::test]
async fn test_destroy_supersedes_in_flight_load() {
    let viewer = Arc::new(ImageViewer::default());
    let mut events = viewer.subscribe();

    let slow = GatedFile::new("slow.tif", "image/tiff", three_page_tiff());
    let gate = slow.gate();
    let load = tokio::spawn({
        let viewer = viewer.clone();
        async move { viewer.load_file(Some(&slow)).await }
    });
    events.recv().await.unwrap();

    viewer.destroy().await;
    gate.notify_one();

    let err = load.await.unwrap().unwrap_err();
    assert!(matches!(err, ViewerError::Superseded));
    assert_eq!(viewer.page_count().await, 0);
    assert_eq!(viewer.state().await.unwrap().total_pages(), 0);

    // The start is still paired with an end, and nothing else follows
    assert_eq!(events.recv().await.unwrap(), ViewerEvent::LoadingEnd);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_destroy_then_reload() {
    let viewer = loaded_viewer().await;
    viewer.jump_to_page(3).await.unwrap();

    viewer.destroy().await;
    let state = viewer.state().await.unwrap();
    assert_eq!(state.current_page(), 0);
    assert_eq!(state.total_pages(), 0);
    assert!(state.file_info().is_none());
    assert!(viewer.pages().await.is_empty());

    let file = MemoryFile::new("again.tif", "image/tiff", three_page_tiff());
    viewer.load_file(Some(&file)).await.unwrap();
    assert_eq!(viewer.state().await.unwrap().current_page(), 0);
    assert_eq!(viewer.page_count().await, 3);
}
