//! Handlers for link management endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::api::dto::links::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::api::dto::pagination::{ListLinksQuery, PaginatedResponse};
use crate::api::middleware::auth::{CurrentUser, MaybeUser};
use crate::domain::entities::ShortLink;
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn to_response(state: &AppState, link: ShortLink) -> LinkResponse {
    let short_url = state.link_service.short_url(&link.slug);
    LinkResponse::new(link, short_url)
}

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// Authentication is optional. Without a bearer token the link is anonymous: it redirects
/// but cannot be listed, edited or deleted.
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "example.com/landing",
///   "slug": "spring-sale",
///   "title": "Spring sale",
///   "description": "Landing page for the spring campaign",
///   "expires_at": "2026-12-31T23:59:59Z"
/// }
/// ```
///
/// Only `original_url` is required. A URL without a scheme gets `https://`.
///
/// # Errors
///
/// - 400 Bad Request for validation failures, malformed or reserved slugs, or a slug that is
///   already taken
/// - 401 Unauthorized if a bearer token is present but invalid
/// - 503 Service Unavailable if no free slug could be generated
pub async fn create_link_handler(
    State(state): State<AppState>,
    MaybeUser(owner_id): MaybeUser,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;

    let link = state
        .link_service
        .create_link(owner_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Lists the caller's active links.
///
/// # Endpoint
///
/// `GET /api/urls?page=1&page_size=10&search=git&sort_by=visit_count&sort_order=desc`
///
/// # Query Parameters
///
/// - `page` (default 1, at least 1 and small enough that its row offset fits in an `i64`)
/// - `page_size` or `limit` (default 10, 1 to 100)
/// - `search`: case-insensitive substring of slug, URL, title or description
/// - `sort_by`: `created_at` (default), `updated_at`, `visit_count`, `last_visited_at`, `title`
/// - `sort_order`: `asc` or `desc` (default)
pub async fn list_links_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    query: Result<Query<ListLinksQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<LinkResponse>>, AppError> {
    let Query(query) = query?;

    let page = state.link_service.list_links(owner_id, query.into()).await?;

    Ok(Json(page.map(|link| to_response(&state, link)).into()))
}

/// `GET /api/urls/{id}`
///
/// Returns 404 if the link does not exist, is deleted, or belongs to someone else.
pub async fn get_link_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Path(id) = id?;

    let link = state.link_service.get_link(id, owner_id).await?;

    Ok(Json(to_response(&state, link)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PUT /api/urls/{id}`
///
/// # Request Body
///
/// At least one field is required. `null` clears `title`, `description` or `expires_at`.
///
/// ```json
/// {
///   "slug": "summer-sale",
///   "original_url": "https://example.com/summer",
///   "title": null,
///   "is_active": true,
///   "expires_at": null
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for an empty body, validation failures or a taken slug
/// - 404 Not Found if the caller has no active link with this id
pub async fn update_link_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateLinkRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let link = state
        .link_service
        .update_link(id, owner_id, payload.into())
        .await?;

    Ok(Json(to_response(&state, link)))
}

/// Soft-deletes a link. Its slug becomes available immediately.
///
/// # Endpoint
///
/// `DELETE /api/urls/{id}`
///
/// Returns 204 No Content, or 404 if the caller has no active link with this id.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;

    state.link_service.delete_link(id, owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
