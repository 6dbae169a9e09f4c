//! Per-link analytics and per-owner dashboard statistics.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Click, ShortLink};
use crate::domain::repositories::{ClickRepository, OwnerSummary, ShortLinkRepository};
use crate::error::AppError;

/// How many recent clicks a link's analytics include.
pub const RECENT_CLICKS: i64 = 10;

/// Analytics for one owned link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAnalytics {
    pub link: ShortLink,
    /// Rows in the click log. Can trail `visit_count` while the worker catches up or after
    /// dropped events.
    pub total_clicks: i64,
    pub recent_clicks: Vec<Click>,
}

/// Read-only analytics over links and the click log.
pub struct StatsService<L, C>
where
    L: ShortLinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    links: Arc<L>,
    clicks: Arc<C>,
}

impl<L, C> StatsService<L, C>
where
    L: ShortLinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    pub fn new(links: Arc<L>, clicks: Arc<C>) -> Self {
        Self { links, clicks }
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] unless an active link with that id belongs to `owner_id`.
    pub async fn link_analytics(&self, id: i64, owner_id: i64) -> Result<LinkAnalytics, AppError> {
        let link = self
            .links
            .find_by_id(id, Some(owner_id))
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))?;

        let total_clicks = self.clicks.count_for_link(link.id).await?;
        let recent_clicks = self.clicks.recent_for_link(link.id, RECENT_CLICKS).await?;

        Ok(LinkAnalytics {
            link,
            total_clicks,
            recent_clicks,
        })
    }

    pub async fn dashboard(&self, owner_id: i64) -> Result<OwnerSummary, AppError> {
        self.links.owner_summary(owner_id).await
    }
}
