//! Navigation and pagination state.
//!
//! [`NavigationState`] is a value type. Every transition takes `&self` and
//! returns a new state; the viewer swaps the new value in. Nothing mutates a
//! state in place, so a snapshot handed to a caller never changes under them.
//!
//! ```text
//!   Empty ──start_load──▶ Loading ──finish_load──▶ Ready(0, n)
//!                            │                        │  ▲
//!                            └──fail──▶ Failed        └──┘ navigate_to / next / previous
//! ```
//!
//! Page indices are zero-based everywhere in this module. The only one-based
//! number is [`PaginationInfo::current_page`], which is meant for display.

use serde::Serialize;

use crate::io::FileInfo;

/// Coarse lifecycle phase derived from a [`NavigationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadPhase {
    Empty,
    Loading,
    Ready,
    Failed,
}

/// Current page, page count, loading flag and last error for one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    current_page: usize,
    total_pages: usize,
    is_loading: bool,
    error: Option<String>,
    file_info: Option<FileInfo>,
}

/// Payload of a page-changed notification. All indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChange {
    pub current_page: usize,
    pub previous_page: usize,
    pub total_pages: usize,
}

/// Display-oriented pagination summary. `current_page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl NavigationState {
    /// Zero-based index of the current page.
    ///
    /// Meaningless while `total_pages() == 0`.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed load, cleared when a new load starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The file of the most recent load attempt.
    pub fn file_info(&self) -> Option<&FileInfo> {
        self.file_info.as_ref()
    }

    pub fn phase(&self) -> LoadPhase {
        if self.is_loading {
            LoadPhase::Loading
        } else if self.error.is_some() {
            LoadPhase::Failed
        } else if self.total_pages > 0 {
            LoadPhase::Ready
        } else {
            LoadPhase::Empty
        }
    }

    /// Enter `Loading` for `file_info`. Everything else resets to defaults.
    pub fn start_load(&self, file_info: FileInfo) -> Self {
        Self {
            is_loading: true,
            file_info: Some(file_info),
            ..Self::default()
        }
    }

    /// Enter `Ready` on the first page of `page_count` pages.
    pub fn finish_load(&self, page_count: usize) -> Self {
        Self {
            current_page: 0,
            total_pages: page_count,
            is_loading: false,
            error: None,
            file_info: self.file_info.clone(),
        }
    }

    /// Enter `Failed`. The page count is left as it was.
    pub fn fail(&self, message: impl Into<String>) -> Self {
        Self {
            is_loading: false,
            error: Some(message.into()),
            ..self.clone()
        }
    }

    /// Move to `index` if it names a page other than the current one.
    ///
    /// Returns `None`, and no new state, when `index` is out of range, when
    /// nothing is loaded, or when `index` is already current.
    pub fn navigate_to(&self, index: usize) -> Option<(Self, PageChange)> {
        if index >= self.total_pages || index == self.current_page {
            return None;
        }

        let change = PageChange {
            current_page: index,
            previous_page: self.current_page,
            total_pages: self.total_pages,
        };
        let next = Self {
            current_page: index,
            ..self.clone()
        };
        Some((next, change))
    }

    pub fn next(&self) -> Option<(Self, PageChange)> {
        self.navigate_to(self.current_page.checked_add(1)?)
    }

    pub fn previous(&self) -> Option<(Self, PageChange)> {
        self.navigate_to(self.current_page.checked_sub(1)?)
    }

    /// Pagination summary, or `None` for files with fewer than two pages.
    pub fn pagination_info(&self) -> Option<PaginationInfo> {
        if self.total_pages <= 1 {
            return None;
        }

        Some(PaginationInfo {
            current_page: self.current_page + 1,
            total_pages: self.total_pages,
            can_go_next: self.current_page < self.total_pages - 1,
            can_go_previous: self.current_page > 0,
        })
    }
}

/// Convert a one-based page number to a zero-based index.
///
/// Returns `None` for zero and negative numbers.
pub fn page_number_to_index(page_number: i64) -> Option<usize> {
    page_number
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
}

// =============================================================================
// Tests
// =============================================================================
