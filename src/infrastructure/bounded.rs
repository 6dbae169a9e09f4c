//! Deadline decorator for repositories.
//!
//! Wraps any repository so that each call either finishes within the configured timeout or
//! fails with [`AppError::StorageUnavailable`]. The inner call is dropped on expiry.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Click, NewClick, NewShortLink, ShortLink, ShortLinkPatch};
use crate::domain::repositories::{
    ApiToken, ClickRepository, LinkListQuery, OwnerSummary, ShortLinkRepository, TokenOwner,
    TokenRepository,
};
use crate::error::AppError;

/// Runs `fut` under `timeout`, labelling the failure with `op`.
pub async fn with_deadline<T, F>(timeout: Duration, op: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            metrics::counter!("storage_timeouts_total", "op" => op).increment(1);
            tracing::warn!(op, timeout_ms = timeout.as_millis() as u64, "Storage call timed out");
            Err(AppError::storage_unavailable(format!(
                "{op} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

pub struct Bounded<R: ?Sized> {
    inner: Arc<R>,
    timeout: Duration,
}

impl<R: ?Sized> Bounded<R> {
    pub fn new(inner: Arc<R>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<R> ShortLinkRepository for Bounded<R>
where
    R: ShortLinkRepository + ?Sized,
{
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        with_deadline(self.timeout, "create_link", self.inner.create(new_link)).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>, AppError> {
        with_deadline(self.timeout, "find_by_slug", self.inner.find_by_slug(slug)).await
    }

    async fn find_by_id(
        &self,
        id: i64,
        owner_id: Option<i64>,
    ) -> Result<Option<ShortLink>, AppError> {
        with_deadline(self.timeout, "find_by_id", self.inner.find_by_id(id, owner_id)).await
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        with_deadline(
            self.timeout,
            "slug_exists",
            self.inner.slug_exists(slug, exclude_id),
        )
        .await
    }

    async fn record_visit(&self, id: i64) -> Result<(), AppError> {
        with_deadline(self.timeout, "record_visit", self.inner.record_visit(id)).await
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        with_deadline(
            self.timeout,
            "soft_delete",
            self.inner.soft_delete(id, owner_id),
        )
        .await
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: ShortLinkPatch,
    ) -> Result<Option<ShortLink>, AppError> {
        with_deadline(
            self.timeout,
            "update_link",
            self.inner.update(id, owner_id, patch),
        )
        .await
    }

    async fn list(
        &self,
        owner_id: i64,
        query: &LinkListQuery,
    ) -> Result<(Vec<ShortLink>, i64), AppError> {
        with_deadline(self.timeout, "list_links", self.inner.list(owner_id, query)).await
    }

    async fn owner_summary(&self, owner_id: i64) -> Result<OwnerSummary, AppError> {
        with_deadline(
            self.timeout,
            "owner_summary",
            self.inner.owner_summary(owner_id),
        )
        .await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        with_deadline(self.timeout, "health_check", self.inner.health_check()).await
    }
}

#[async_trait]
impl<R> ClickRepository for Bounded<R>
where
    R: ClickRepository + ?Sized,
{
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError> {
        with_deadline(self.timeout, "record_click", self.inner.record_click(click)).await
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        with_deadline(
            self.timeout,
            "count_clicks",
            self.inner.count_for_link(link_id),
        )
        .await
    }

    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        with_deadline(
            self.timeout,
            "recent_clicks",
            self.inner.recent_for_link(link_id, limit),
        )
        .await
    }
}

#[async_trait]
impl<R> TokenRepository for Bounded<R>
where
    R: TokenRepository + ?Sized,
{
    async fn find_owner(&self, token_hash: &str) -> Result<Option<TokenOwner>, AppError> {
        with_deadline(self.timeout, "find_token_owner", self.inner.find_owner(token_hash)).await
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        with_deadline(
            self.timeout,
            "touch_token",
            self.inner.update_last_used(token_hash),
        )
        .await
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        with_deadline(
            self.timeout,
            "create_token",
            self.inner.create_token(user_id, name, token_hash),
        )
        .await
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        with_deadline(self.timeout, "list_tokens", self.inner.list_tokens()).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        with_deadline(self.timeout, "find_token", self.inner.find_by_name(name)).await
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        with_deadline(self.timeout, "revoke_token", self.inner.revoke_token(id)).await
    }
}
