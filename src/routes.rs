//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`  - Short link redirect (public)
//! - `GET  /health`  - Health check: database and click queue (public)
//! - `/api/*`        - Link management API, see [`crate::api::routes`]
//!
//! Static routes take precedence over `/{slug}`; slugs with reserved prefixes never resolve,
//! so the two cannot shadow each other.
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging
//! - **Rate limiting** - per-IP token bucket on `/api` and redirects
//! - **Path normalization** - trailing slash trimming

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, Quota};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

fn with_rate_limit(router: Router<AppState>, quota: Quota, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        router.layer(rate_limit::proxied_layer(quota))
    } else {
        router.layer(rate_limit::peer_layer(quota))
    }
}

fn build(state: AppState, limits: Option<bool>) -> Router {
    let mut api_router = api::routes::api_routes(state.clone());
    let mut redirects = Router::new().route("/{slug}", get(redirect_handler));

    if let Some(behind_proxy) = limits {
        api_router = with_rate_limit(api_router, rate_limit::API, behind_proxy);
        redirects = with_rate_limit(redirects, rate_limit::REDIRECT, behind_proxy);
    }

    Router::new()
        .merge(redirects)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// All routes without rate limiting, for embedding and tests.
pub fn core_router(state: AppState) -> Router {
    build(state, None)
}

/// Constructs the production router.
///
/// `behind_proxy` keys rate limits on `X-Forwarded-For` / `X-Real-IP` instead of the peer
/// socket address. Enable only behind a trusted reverse proxy.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build(state, Some(behind_proxy)))
}
