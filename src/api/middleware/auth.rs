//! Bearer token authentication.
//!
//! Protected routes run [`layer`], which resolves the token to a user id and stores it as a
//! [`CurrentUser`] request extension. Routes where authentication is optional extract
//! [`MaybeUser`] instead.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Id of the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// Id of the authenticated user, or `None` for anonymous requests.
///
/// A request without `Authorization` is anonymous; a request with a bad token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<i64>);

fn missing_credentials() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({"reason": "Authorization header is missing or invalid"}),
    )
}

async fn bearer_user(parts: &mut Parts, state: &AppState) -> Result<i64, AppError> {
    let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
        .await
        .map_err(|_| missing_credentials())?;

    state.auth_service.authenticate(&token).await
}

/// Authenticates `Authorization: Bearer <token>` and records the caller as [`CurrentUser`].
///
/// # Errors
///
/// - `401 Unauthorized` if the header is missing or malformed, or the token is unknown or
///   revoked. The response carries `WWW-Authenticate: Bearer` per RFC 6750.
/// - `403 Forbidden` if the token's user is deactivated
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/urls/{id}", get(get_link_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let user_id = bearer_user(&mut parts, &st).await?;
    parts.extensions.insert(CurrentUser(user_id));

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(missing_credentials)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(CurrentUser(id)) = parts.extensions.get::<CurrentUser>() {
            return Ok(MaybeUser(Some(*id)));
        }

        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(MaybeUser(None));
        }

        bearer_user(parts, state).await.map(|id| MaybeUser(Some(id)))
    }
}
