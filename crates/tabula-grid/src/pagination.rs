//! Pagination state and controls
//!
//! `PageState` is the internal pager: it slices the filtered rows. The
//! external mode never slices; the caller owns the data window and the
//! grid only forwards navigation through a callback.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Internal pagination state (1-indexed pages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Current page number (1-indexed)
    pub current_page: usize,
    /// Rows per page
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Total pages for a row count (never less than 1)
    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Index of the first row on the current page
    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    /// Row index range for the current page, clamped to the row count
    pub fn page_bounds(&self, total_rows: usize) -> (usize, usize) {
        let start = self.offset().min(total_rows);
        let end = (start + self.page_size).min(total_rows);
        (start, end)
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self, total_rows: usize) -> bool {
        self.current_page < self.total_pages(total_rows)
    }

    pub fn go_prev(&mut self) {
        if self.can_go_prev() {
            self.current_page -= 1;
        }
    }

    pub fn go_next(&mut self, total_rows: usize) {
        if self.can_go_next(total_rows) {
            self.current_page += 1;
        }
    }

    pub fn go_first(&mut self) {
        self.current_page = 1;
    }

    pub fn go_last(&mut self, total_rows: usize) {
        self.current_page = self.total_pages(total_rows);
    }

    /// Navigate to a specific page, clamped to the valid range
    pub fn go_to_page(&mut self, page: usize, total_rows: usize) {
        self.current_page = page.clamp(1, self.total_pages(total_rows));
    }

    /// Change the page size; resets to the first page
    pub fn set_page_size(&mut self, page_size: usize) {
        if self.page_size != page_size.max(1) {
            self.page_size = page_size.max(1);
            self.current_page = 1;
        }
    }
}

/// Externally controlled pagination: the caller owns the data window
#[derive(Clone)]
pub struct ExternalPages {
    pub current_page: usize,
    pub total_pages: usize,
    pub on_page_change: Option<Rc<dyn Fn(usize)>>,
}

impl std::fmt::Debug for ExternalPages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalPages")
            .field("current_page", &self.current_page)
            .field("total_pages", &self.total_pages)
            .finish_non_exhaustive()
    }
}

impl ExternalPages {
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        Self {
            current_page: current_page.max(1),
            total_pages: total_pages.max(1),
            on_page_change: None,
        }
    }

    pub fn on_page_change(mut self, callback: impl Fn(usize) + 'static) -> Self {
        self.on_page_change = Some(Rc::new(callback));
        self
    }
}

/// Pagination controller: internal slicing or external forwarding
#[derive(Debug, Clone)]
pub enum Pagination {
    Internal(PageState),
    External(ExternalPages),
}

impl Default for Pagination {
    fn default() -> Self {
        Self::Internal(PageState::default())
    }
}

impl Pagination {
    pub fn current_page(&self) -> usize {
        match self {
            Self::Internal(state) => state.current_page,
            Self::External(pages) => pages.current_page,
        }
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        match self {
            Self::Internal(state) => state.total_pages(total_rows),
            Self::External(pages) => pages.total_pages,
        }
    }

    /// Row index range of the visible page; external mode shows all rows
    pub fn page_bounds(&self, total_rows: usize) -> (usize, usize) {
        match self {
            Self::Internal(state) => state.page_bounds(total_rows),
            Self::External(_) => (0, total_rows),
        }
    }

    /// Navigate to a page; external mode notifies the owner instead of
    /// slicing
    pub fn go_to_page(&mut self, page: usize, total_rows: usize) {
        match self {
            Self::Internal(state) => state.go_to_page(page, total_rows),
            Self::External(pages) => {
                let page = page.clamp(1, pages.total_pages);
                if page != pages.current_page {
                    pages.current_page = page;
                    if let Some(callback) = &pages.on_page_change {
                        callback(page);
                    }
                }
            }
        }
    }

    pub fn go_next(&mut self, total_rows: usize) {
        self.go_to_page(self.current_page() + 1, total_rows);
    }

    pub fn go_prev(&mut self, total_rows: usize) {
        self.go_to_page(self.current_page().saturating_sub(1), total_rows);
    }

    /// Reset to the first page (after filters change)
    pub fn reset(&mut self) {
        if let Self::Internal(state) = self {
            state.go_first();
        }
    }
}

/// Footer summary for "showing X of Y"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Rows visible on the current page
    pub shown: usize,
    /// Rows after filtering
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl PageSummary {
    pub fn status_text(&self) -> String {
        format!("showing {} of {}", self.shown, self.total)
    }
}
