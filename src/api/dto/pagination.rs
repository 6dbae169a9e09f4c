//! Listing query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::ListLinks;
use crate::domain::repositories::{SortField, SortOrder};

/// Query string for `GET /api/urls`.
///
/// `page` and `page_size` arrive as strings and are parsed with `serde_with`; range checks
/// happen in [`ListLinks`] validation. `limit` is accepted as a spelling of `page_size`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListLinksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, alias = "limit", alias = "pageSize")]
    pub page_size: Option<i64>,

    #[serde(default)]
    pub search: Option<String>,

    #[serde(default, alias = "sortBy")]
    pub sort_by: Option<SortField>,

    #[serde(default, alias = "sortOrder")]
    pub sort_order: Option<SortOrder>,
}

impl From<ListLinksQuery> for ListLinks {
    fn from(q: ListLinksQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            search: q.search,
            sort_by: q.sort_by,
            sort_order: q.sort_order,
        }
    }
}

/// Navigation counters shared by paginated responses.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// A page of items plus its [`PaginationMeta`].
#[derive(Debug, serde::Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> From<crate::domain::entities::Page<T>> for PaginatedResponse<T> {
    fn from(page: crate::domain::entities::Page<T>) -> Self {
        Self {
            pagination: PaginationMeta {
                page: page.page,
                page_size: page.page_size,
                total: page.total,
                total_pages: page.total_pages,
                has_next: page.has_next,
                has_prev: page.has_prev,
            },
            items: page.items,
        }
    }
}
