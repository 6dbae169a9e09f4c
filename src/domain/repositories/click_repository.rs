//! Repository trait for the append-only click log.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on transient database failures; the click
    /// worker retries those.
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError>;

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;

    /// Most recent clicks first.
    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError>;
}
