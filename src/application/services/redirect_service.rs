//! Slug resolution for the public redirect path.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::click_event::{ClickEvent, VisitorInfo};
use crate::domain::entities::ShortLink;
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::utils::slug_codec;

/// Resolves a slug to its destination and records the visit.
///
/// The visit counter is incremented by the store in a single statement, so concurrent
/// redirects never lose increments. Click details go to the background worker through a
/// bounded channel and are dropped, not awaited, when the channel is full.
pub struct RedirectResolver<R: ShortLinkRepository + ?Sized> {
    repository: Arc<R>,
    click_sender: Option<mpsc::Sender<ClickEvent>>,
}

impl<R: ShortLinkRepository + ?Sized> RedirectResolver<R> {
    /// Pass `None` for `click_sender` to record visit counts only.
    pub fn new(repository: Arc<R>, click_sender: Option<mpsc::Sender<ClickEvent>>) -> Self {
        Self {
            repository,
            click_sender,
        }
    }

    /// Looks up an active, unexpired link by slug.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] for reserved prefixes, unknown or soft-deleted slugs
    /// - [`AppError::Expired`] if `expires_at` is at or before now; the visit is not counted
    /// - [`AppError::StorageUnavailable`] if the lookup fails or times out
    ///
    /// A failed visit increment is logged and does not fail the redirect.
    pub async fn resolve(&self, slug: &str, visitor: VisitorInfo) -> Result<ShortLink, AppError> {
        if slug_codec::is_reserved(slug) {
            return Err(Self::not_found(slug));
        }

        let link = self
            .repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| Self::not_found(slug))?;

        if link.is_expired_at(Utc::now()) {
            metrics::counter!("redirects_expired_total").increment(1);
            return Err(AppError::expired(
                "Short link has expired",
                json!({ "slug": slug, "expires_at": link.expires_at }),
            ));
        }

        if let Err(e) = self.repository.record_visit(link.id).await {
            tracing::warn!(link_id = link.id, slug, error = ?e, "Failed to record visit");
        }

        if let Some(sender) = &self.click_sender
            && sender.try_send(ClickEvent::new(link.id, visitor)).is_err()
        {
            metrics::counter!("clicks_dropped_total").increment(1);
            tracing::debug!(link_id = link.id, "Click queue full, event dropped");
        }

        metrics::counter!("redirects_total").increment(1);
        Ok(link)
    }

    fn not_found(slug: &str) -> AppError {
        AppError::not_found("Short link not found", json!({ "slug": slug }))
    }
}
