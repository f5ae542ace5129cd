//! Pagination state and the server request payload

use serde::Deserialize;
use serde::Serialize;

use crate::sort::SortItem;

fn default_page_size_options() -> Vec<usize> {
    vec![10, 25, 50, 100]
}

/// Caller-owned pagination state.
///
/// Pages are 1-based. `total` is the total item count reported by the
/// server, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: Option<usize>,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            total: None,
            page_size_options: default_page_size_options(),
        }
    }
}

impl Pagination {
    /// Creates pagination at page 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Sets the total item count.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Number of pages, if the total is known. At least 1.
    pub fn page_count(&self) -> Option<usize> {
        self.total
            .map(|total| total.div_ceil(self.page_size.max(1)).max(1))
    }

    /// Moves to a page, clamped to the known page range. Returns `true` if
    /// the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let mut page = page.max(1);
        if let Some(count) = self.page_count() {
            page = page.min(count);
        }
        let changed = page != self.page;
        self.page = page;
        changed
    }

    /// Changes the page size and returns to the first page. Returns `true`
    /// if anything changed.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let page_size = page_size.max(1);
        let changed = page_size != self.page_size || self.page != 1;
        self.page_size = page_size;
        self.page = 1;
        changed
    }

    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// Payload of a server data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub page: usize,
    pub page_size: usize,
    /// Always a list, also for single-column sort.
    pub sort: Vec<SortItem>,
}

impl RequestPayload {
    /// Builds a payload from pagination and sort state.
    pub fn new(pagination: &Pagination, sort: Vec<SortItem>) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            sort,
        }
    }
}
