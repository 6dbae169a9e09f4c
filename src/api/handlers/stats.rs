//! Handlers for link analytics and the owner dashboard.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use super::links::to_response;
use crate::api::dto::stats::{AnalyticsResponse, DashboardResponse};
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Visit statistics for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/urls/{id}/analytics`
///
/// `visit_count` is exact. `total_clicks` counts the click log, which is written in the
/// background and can lag behind or miss dropped events.
///
/// # Errors
///
/// Returns 404 Not Found if the caller has no active link with this id.
pub async fn analytics_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let Path(id) = id?;

    let analytics = state.stats_service.link_analytics(id, owner_id).await?;
    let link = analytics.link;

    Ok(Json(AnalyticsResponse {
        short_url: state.link_service.short_url(&link.slug),
        id: link.id,
        slug: link.slug,
        original_url: link.original_url,
        visit_count: link.visit_count,
        last_visited_at: link.last_visited_at,
        created_at: link.created_at,
        updated_at: link.updated_at,
        total_clicks: analytics.total_clicks,
        recent_clicks: analytics
            .recent_clicks
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

/// Totals plus the top five links by visits and the five newest links.
///
/// # Endpoint
///
/// `GET /api/urls/dashboard/stats`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let summary = state.stats_service.dashboard(owner_id).await?;

    Ok(Json(DashboardResponse {
        total_links: summary.total_links,
        total_visits: summary.total_visits,
        top_links: summary
            .top_links
            .into_iter()
            .map(|link| to_response(&state, link))
            .collect(),
        recent_links: summary
            .recent_links
            .into_iter()
            .map(|link| to_response(&state, link))
            .collect(),
    }))
}
