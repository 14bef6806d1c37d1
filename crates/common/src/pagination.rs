//! Page-based pagination for list endpoints
//!
//! Requests carry `page` (1-based) and `pageSize`; responses wrap the items
//! with totals and navigation flags.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// Current page, at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, defaulting to 20, clamped to 1..=100
    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    /// Row limit for SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.page_size()
    }
}

/// A page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: &PageRequest) -> Self {
        let page = request.page();
        let page_size = request.page_size();
        let total_count = total_count.max(0);
        let total_pages = (total_count + page_size - 1) / page_size;

        Self {
            items,
            total_count,
            page,
            page_size,
            total_pages,
            has_previous_page: page > 1,
            has_next_page: page < total_pages,
        }
    }

    /// Convert the items while keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}
