//! The image viewer: file load orchestration, navigation and rendering.
//!
//! # Shared State
//!
//! The page store and the navigation state live under one `RwLock` and are
//! always written together, so `total_pages` can never disagree with the
//! number of stored pages.
//!
//! # Superseded Loads
//!
//! Every load that passes validation takes a new generation number while
//! holding the write lock. Decoding happens outside the lock. When the decode
//! finishes, its result is committed only if the generation is still current;
//! otherwise it is dropped and the caller gets [`ViewerError::Superseded`].
//! A slow first load can therefore never overwrite a faster second one.
//! [`ImageViewer::destroy`] also advances the generation.
//!
//! Every `LoadingStart` is matched by exactly one `LoadingEnd`, superseded
//! loads included. A superseded load emits nothing else.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::decode::decode_pages;
use crate::error::{InputError, NavigationError, RenderError, ViewerError};
use crate::format::{is_supported, DecodePath, SUPPORTED_TYPES};
use crate::io::{FileInfo, FileSource};
use crate::navigation::{page_number_to_index, NavigationState, PageChange, PaginationInfo};
use crate::page::{PageSequence, RasterPage};
use crate::render::{render, DisplayRect, InfoOverlay, RenderOptions, RenderTarget};

use super::events::{LoadSummary, ViewerEvent};

#[derive(Debug, Default)]
struct ViewerState {
    pages: PageSequence,

    /// `None` until the first load passes validation
    navigation: Option<NavigationState>,

    /// Generation of the most recently started load
    generation: u64,
}

/// Viewer for raster images, including multi-page TIFF.
///
/// All methods take `&self`; the viewer can be shared across tasks in an
/// `Arc`.
pub struct ImageViewer {
    config: ViewerConfig,
    state: RwLock<ViewerState>,
    events: broadcast::Sender<ViewerEvent>,
}

impl ImageViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            state: RwLock::new(ViewerState::default()),
            events,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Media types this viewer accepts by declaration.
    pub fn supported_types(&self) -> &'static [&'static str] {
        SUPPORTED_TYPES
    }

    /// Receive notifications for every subsequent state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ViewerEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load a file, replacing whatever was loaded before.
    ///
    /// Input problems (no file, unsupported type) are reported before any
    /// state is touched. Once validation passes, the previous pages are
    /// discarded immediately, so a failed load never leaves them reachable.
    ///
    /// # Errors
    /// - `Input` for a missing file or an unsupported type
    /// - `Decode` if reading or decoding fails; state moves to `Failed`
    /// - `Superseded` if a newer load or a destroy happened meanwhile
    pub async fn load_file(
        &self,
        file: Option<&dyn FileSource>,
    ) -> Result<LoadSummary, ViewerError> {
        let file = file.ok_or(InputError::MissingFile)?;

        if !is_supported(file.media_type(), file.name()) {
            return Err(InputError::UnsupportedType {
                media_type: file.media_type().to_string(),
            }
            .into());
        }

        let file_info = FileInfo::from_source(file);
        let path = DecodePath::select(file.media_type(), file.name());

        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.pages.clear();
            let navigation = state.navigation.take().unwrap_or_default();
            state.navigation = Some(navigation.start_load(file_info.clone()));
            state.generation
        };

        info!(
            file = %file_info.name,
            media_type = %file_info.media_type,
            size = file_info.size,
            path = path.name(),
            generation,
            "Loading file"
        );
        self.emit(ViewerEvent::LoadingStart {
            file_info: file_info.clone(),
        });

        let decoded = match file.read_all().await {
            Ok(bytes) => decode_pages(path, bytes).await,
            Err(e) => Err(e.into()),
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                file = %file_info.name,
                generation,
                current = state.generation,
                "Discarding superseded load"
            );
            drop(state);
            self.emit(ViewerEvent::LoadingEnd);
            return Err(ViewerError::Superseded);
        }

        let navigation = state.navigation.take().unwrap_or_default();
        match decoded {
            Ok(pages) => {
                let page_count = pages.len();
                state.pages.load(pages);
                state.navigation = Some(navigation.finish_load(page_count));
                drop(state);

                info!(file = %file_info.name, pages = page_count, "File loaded");
                self.emit(ViewerEvent::LoadingEnd);
                self.emit(ViewerEvent::Loaded {
                    page_count,
                    file_info: file_info.clone(),
                });

                Ok(LoadSummary {
                    page_count,
                    file_info,
                })
            }
            Err(err) => {
                let message = err.to_string();
                state.navigation = Some(navigation.fail(message.clone()));
                drop(state);

                warn!(file = %file_info.name, error = %message, "File load failed");
                self.emit(ViewerEvent::LoadingEnd);
                self.emit(ViewerEvent::Error { message });

                Err(err.into())
            }
        }
    }

    // =========================================================================
    // State Queries
    // =========================================================================

    /// Snapshot of the navigation state, `None` before the first load.
    pub async fn state(&self) -> Option<NavigationState> {
        self.state.read().await.navigation.clone()
    }

    /// All pages of the current file.
    pub async fn pages(&self) -> Arc<[RasterPage]> {
        self.state.read().await.pages.all()
    }

    pub async fn page_count(&self) -> usize {
        self.state.read().await.pages.len()
    }

    /// The page at `index`, if loaded.
    pub async fn page(&self, index: usize) -> Option<RasterPage> {
        self.state.read().await.pages.get(index).cloned()
    }

    /// The page the navigation state points at.
    pub async fn current_page(&self) -> Option<RasterPage> {
        let state = self.state.read().await;
        let index = state.navigation.as_ref()?.current_page();
        state.pages.get(index).cloned()
    }

    pub async fn pagination_info(&self) -> Option<PaginationInfo> {
        self.state
            .read()
            .await
            .navigation
            .as_ref()
            .and_then(NavigationState::pagination_info)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Apply a navigation step chosen from the current state.
    ///
    /// `Ok(None)` means the target was out of range and nothing changed.
    async fn navigate_with<F>(&self, target: F) -> Result<Option<PageChange>, NavigationError>
    where
        F: FnOnce(&NavigationState) -> Option<(NavigationState, PageChange)>,
    {
        let mut state = self.state.write().await;
        let navigation = state.navigation.as_ref().ok_or(NavigationError::NotLoaded)?;

        let Some((next, change)) = target(navigation) else {
            debug!("Navigation target out of range, ignoring");
            return Ok(None);
        };

        state.navigation = Some(next);
        drop(state);

        debug!(
            page = change.current_page,
            previous = change.previous_page,
            total = change.total_pages,
            "Page changed"
        );
        self.emit(ViewerEvent::PageChanged(change));
        Ok(Some(change))
    }

    /// Go to a zero-based page index.
    ///
    /// # Errors
    /// `NotLoaded` if no load has been attempted yet.
    pub async fn navigate_to_page(
        &self,
        index: usize,
    ) -> Result<Option<PageChange>, NavigationError> {
        self.navigate_with(|nav| nav.navigate_to(index)).await
    }

    pub async fn next_page(&self) -> Result<Option<PageChange>, NavigationError> {
        self.navigate_with(NavigationState::next).await
    }

    pub async fn previous_page(&self) -> Result<Option<PageChange>, NavigationError> {
        self.navigate_with(NavigationState::previous).await
    }

    /// Go to a one-based page number, as shown to users.
    ///
    /// Zero, negative and too-large numbers are ignored.
    pub async fn jump_to_page(
        &self,
        page_number: i64,
    ) -> Result<Option<PageChange>, NavigationError> {
        let index = page_number_to_index(page_number);
        self.navigate_with(|nav| index.and_then(|i| nav.navigate_to(i)))
            .await
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Draw the current page onto `target`.
    ///
    /// Uses the configured render options unless `options` is given. Render
    /// failures never change the viewer's state.
    pub async fn render_to_target(
        &self,
        target: &mut dyn RenderTarget,
        options: Option<RenderOptions>,
    ) -> Result<DisplayRect, RenderError> {
        let options = options.unwrap_or(self.config.render);

        let (page, overlay) = {
            let state = self.state.read().await;
            let navigation = state.navigation.as_ref().ok_or(RenderError::NoPage)?;
            let page = state
                .pages
                .get(navigation.current_page())
                .cloned()
                .ok_or(RenderError::NoPage)?;
            let overlay = navigation
                .file_info()
                .map(|info| InfoOverlay::new(info, navigation.pagination_info().as_ref()));
            (page, overlay)
        };

        render(&page, target, &options, overlay.as_ref())
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Drop all pages and reset the navigation state to its defaults.
    ///
    /// Any load still in flight is superseded.
    pub async fn destroy(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.pages.clear();
        state.navigation = Some(NavigationState::default());
        debug!(generation = state.generation, "Viewer destroyed");
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl std::fmt::Debug for ImageViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageViewer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
