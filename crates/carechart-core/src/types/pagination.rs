//! Page windows over account, audit, patient and record listings.
//!
//! Postgres stores turn a [`PageRequest`] into `LIMIT`/`OFFSET` and hand the
//! fetched rows back through [`PageRequest::respond`]; in-memory stores pass
//! their full, already-ordered result to [`PageRequest::paginate`].

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 100;

/// Which slice of a listing the caller wants. Pages start at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Page 0 becomes page 1 and the size is held within `1..=100`.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Wrap rows already limited to this page, given the unpaged total.
    pub fn respond<T: Serialize>(&self, items: Vec<T>, total_items: u64) -> PageResponse<T> {
        let total_pages = total_items.div_ceil(self.page_size.max(1)).max(1);
        PageResponse {
            items,
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages,
            has_next: self.page < total_pages,
            has_previous: self.page > 1,
        }
    }

    /// Cut this page out of a complete, ordered result set.
    pub fn paginate<T: Serialize>(&self, all: Vec<T>) -> PageResponse<T> {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        self.respond(items, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(first_page(), DEFAULT_PAGE_SIZE)
    }
}

/// One page of a listing plus the counts a client needs to walk the rest.
/// An empty listing still reports a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Convert every item, e.g. entity to response DTO.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

fn first_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
