//! Handler for short link redirects.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{Extensions, HeaderMap},
    response::Redirect,
};
use std::net::SocketAddr;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::visitor_from_parts;

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// The visit counter is incremented before responding; the click log entry is written in
/// the background and may be dropped under load.
///
/// # Errors
///
/// - 404 Not Found for unknown, deleted or reserved slugs
/// - 410 Gone for expired links
/// - 503 Service Unavailable if storage does not answer in time
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Result<Redirect, AppError> {
    // ConnectInfo is absent when the router is served without connect info, as in tests.
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let visitor = visitor_from_parts(&headers, peer, state.behind_proxy);

    let link = state.redirect_resolver.resolve(&slug, visitor).await?;

    tracing::debug!(slug, link_id = link.id, "Redirecting");

    Ok(Redirect::to(&link.original_url))
}
