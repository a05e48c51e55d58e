//! Page/size pagination types.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page/size query parameters.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct PageQuery {
    /// Page number (1-indexed, default: 1).
    pub page: Option<i64>,

    /// Items per page (default: 20, max: 100).
    pub size: Option<i64>,
}

impl PageQuery {
    /// Page number, clamped to at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Items per page, clamped to 1-100.
    pub fn size(&self) -> i64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for SQL queries.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.size()
    }
}

/// One page of results with the total row count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Wraps one already-fetched page of rows.
    pub fn new(items: Vec<T>, query: &PageQuery, total: i64) -> Self {
        let size = query.size();
        Self {
            items,
            page: query.page(),
            size,
            total,
            total_pages: total_pages(total, size),
        }
    }

    /// Paginates an in-memory result set (used when a filter cannot be pushed
    /// down to SQL, e.g. geo-radius).
    pub fn from_full_set(all: Vec<T>, query: &PageQuery) -> Self {
        let total = all.len() as i64;
        let size = query.size();
        let offset = query.offset() as usize;

        let items: Vec<T> = all
            .into_iter()
            .skip(offset)
            .take(size as usize)
            .collect();

        Self {
            items,
            page: query.page(),
            size,
            total,
            total_pages: total_pages(total, size),
        }
    }
}

fn total_pages(total: i64, size: i64) -> i64 {
    (total + size - 1) / size
}
