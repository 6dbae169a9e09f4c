//! API route configuration.

use crate::api::handlers::{
    analytics_handler, create_link_handler, dashboard_handler, delete_link_handler,
    get_link_handler, list_links_handler, update_link_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /urls`                  - Create a link (bearer token optional)
/// - `GET    /urls`                  - List own links
/// - `GET    /urls/dashboard/stats`  - Owner dashboard
/// - `GET    /urls/{id}`             - Get an own link
/// - `PUT    /urls/{id}`             - Update an own link
/// - `DELETE /urls/{id}`             - Soft-delete an own link
/// - `GET    /urls/{id}/analytics`   - Visit statistics for an own link
///
/// Everything except `POST /urls` runs behind [`auth::layer`].
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/urls", get(list_links_handler))
        .route("/urls/dashboard/stats", get(dashboard_handler))
        .route(
            "/urls/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/urls/{id}/analytics", get(analytics_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer));

    let public = Router::new().route("/urls", post(create_link_handler));

    Router::new().merge(protected).merge(public)
}
