//! DTOs for analytics and dashboard endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::links::LinkResponse;
use crate::domain::entities::Click;

/// One entry of the click log.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<Click> for ClickInfo {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            ip_address: click.ip_address,
            user_agent: click.user_agent,
            referer: click.referer,
        }
    }
}

/// Response for `GET /api/urls/{id}/analytics`.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub id: i64,
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub visit_count: i64,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_clicks: i64,
    pub recent_clicks: Vec<ClickInfo>,
}

/// Response for `GET /api/urls/dashboard/stats`.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_links: i64,
    pub total_visits: i64,
    pub top_links: Vec<LinkResponse>,
    pub recent_links: Vec<LinkResponse>,
}
