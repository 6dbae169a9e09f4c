//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink, ShortLinkPatch};
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Column a link listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    #[serde(alias = "updatedAt")]
    UpdatedAt,
    #[serde(alias = "visitCount")]
    VisitCount,
    #[serde(alias = "lastVisitedAt")]
    LastVisitedAt,
    Title,
}

impl SortField {
    /// Column name used in SQL `ORDER BY`. Never derived from user input.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::VisitCount => "visit_count",
            Self::LastVisitedAt => "last_visited_at",
            Self::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Listing parameters after validation.
///
/// `page` is 1-based. `search` is trimmed and non-empty when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkListQuery {
    pub page: i64,
    pub page_size: i64,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for LinkListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            search: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl LinkListQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Aggregates over one owner's active links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerSummary {
    pub total_links: i64,
    pub total_visits: i64,
    /// Up to five links with the most visits.
    pub top_links: Vec<ShortLink>,
    /// Up to five most recently created links.
    pub recent_links: Vec<ShortLink>,
}

/// Stateless persistence interface for short links.
///
/// Every read returns a fresh snapshot and every write is a single scoped statement. Only
/// active links (`is_active = true`) are visible through lookups, listings and updates.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process store
/// - [`crate::infrastructure::bounded::Bounded`] - timeout decorator
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Inserts a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateSlug`] if another active link already holds the slug.
    /// This check is authoritative; any pre-check by the caller is advisory only.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds an active link by exact slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds an active link by id. When `owner_id` is given, links owned by anyone else
    /// are treated as absent.
    async fn find_by_id(&self, id: i64, owner_id: Option<i64>)
    -> Result<Option<ShortLink>, AppError>;

    /// Returns true if an active link other than `exclude_id` holds the slug.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError>;

    /// Atomically increments `visit_count` and sets `last_visited_at` to now.
    ///
    /// The increment is evaluated by the store, never read-modify-write in the caller, so
    /// concurrent redirects never lose counts.
    async fn record_visit(&self, id: i64) -> Result<(), AppError>;

    /// Marks an owned active link inactive. Returns `false` if no such link exists.
    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;

    /// Applies a patch to an owned active link and returns the updated row.
    ///
    /// Returns `Ok(None)` if no active link with that id belongs to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateSlug`] if the new slug is taken by another active link.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: ShortLinkPatch,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Lists an owner's active links for one page and returns the total match count.
    async fn list(
        &self,
        owner_id: i64,
        query: &LinkListQuery,
    ) -> Result<(Vec<ShortLink>, i64), AppError>;

    /// Dashboard aggregates over an owner's active links.
    async fn owner_summary(&self, owner_id: i64) -> Result<OwnerSummary, AppError>;

    /// Verifies the store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
