//! File viewers.
//!
//! [`ImageViewer`] is the only implementation today. [`FileViewer`] is the
//! dispatch table keyed by [`MediaCategory`]: adding video, audio or
//! document support means adding a variant here, not a new trait
//! hierarchy.

mod events;
mod image_viewer;

use crate::config::ViewerConfig;
use crate::error::{InputError, ViewerError};
use crate::format::MediaCategory;
use crate::io::FileSource;

pub use self::events::{LoadResult, LoadSummary, ViewerEvent};
pub use self::image_viewer::ImageViewer;

/// A viewer for one media category.
///
/// We use an enum instead of trait objects because the viewers' methods are
/// async and the set of categories is closed.
#[derive(Debug)]
pub enum FileViewer {
    Image(ImageViewer),
}

impl FileViewer {
    /// Build the viewer for `category`, or `None` if the category has no
    /// implementation.
    pub fn for_category(category: MediaCategory, config: ViewerConfig) -> Option<Self> {
        match category {
            MediaCategory::Image => Some(FileViewer::Image(ImageViewer::new(config))),
            MediaCategory::Video | MediaCategory::Audio | MediaCategory::Document => None,
        }
    }

    /// Build the viewer for a file by detecting its category.
    ///
    /// # Errors
    /// `UnsupportedType` when the category is unknown or not implemented.
    pub fn for_file(file: &dyn FileSource, config: ViewerConfig) -> Result<Self, ViewerError> {
        MediaCategory::detect(file.media_type(), file.name())
            .and_then(|category| Self::for_category(category, config))
            .ok_or_else(|| {
                InputError::UnsupportedType {
                    media_type: file.media_type().to_string(),
                }
                .into()
            })
    }

    pub fn category(&self) -> MediaCategory {
        match self {
            FileViewer::Image(_) => MediaCategory::Image,
        }
    }

    pub fn supported_types(&self) -> &'static [&'static str] {
        match self {
            FileViewer::Image(viewer) => viewer.supported_types(),
        }
    }

    pub async fn load_file(
        &self,
        file: Option<&dyn FileSource>,
    ) -> Result<LoadSummary, ViewerError> {
        match self {
            FileViewer::Image(viewer) => viewer.load_file(file).await,
        }
    }

    pub async fn destroy(&self) {
        match self {
            FileViewer::Image(viewer) => viewer.destroy().await,
        }
    }

    /// The image viewer, if this is one.
    pub fn as_image(&self) -> Option<&ImageViewer> {
        match self {
            FileViewer::Image(viewer) => Some(viewer),
        }
    }
}
