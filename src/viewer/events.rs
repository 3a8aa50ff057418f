//! Notifications and load results.

use serde::Serialize;

use crate::error::ViewerError;
use crate::io::FileInfo;
use crate::navigation::PageChange;

/// Notification emitted by a viewer on a real state transition.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"pageChanged","currentPage":1,"previousPage":0,"totalPages":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewerEvent {
    /// A load passed validation and is about to read and decode
    LoadingStart { file_info: FileInfo },

    /// A load finished or was superseded
    LoadingEnd,

    /// A load succeeded and its pages are current
    Loaded {
        page_count: usize,
        file_info: FileInfo,
    },

    /// The current page moved
    PageChanged(PageChange),

    /// A load failed; the message is also in the navigation state
    Error { message: String },
}

/// What a successful load produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub page_count: usize,
    pub file_info: FileInfo,
}

/// Structural view of a load outcome: `{success, pageCount?, fileInfo?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResult {
    pub fn from_result(result: &Result<LoadSummary, ViewerError>) -> Self {
        match result {
            Ok(summary) => Self {
                success: true,
                page_count: Some(summary.page_count),
                file_info: Some(summary.file_info.clone()),
                error: None,
            },
            Err(err) => Self {
                success: false,
                page_count: None,
                file_info: None,
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<Result<LoadSummary, ViewerError>> for LoadResult {
    fn from(result: Result<LoadSummary, ViewerError>) -> Self {
        Self::from_result(&result)
    }
}
