//! Offset pagination result.

use serde::Serialize;

/// One page of results plus the counters clients need to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Builds a page. `page` is 1-based and `page_size` must be positive.
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let page_size = page_size.max(1);
        let total = total.max(0);
        let total_pages = total / page_size + i64::from(total % page_size != 0);

        Self {
            items,
            page,
            page_size,
            total,
            total_pages,
            has_next: page.saturating_mul(page_size) < total,
            has_prev: page > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}
