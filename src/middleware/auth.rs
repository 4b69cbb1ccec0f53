use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::auth::Principal;
use crate::config::config;
use crate::state::AppState;

/// Resolve the session cookie to a [`Principal`] and make it available to
/// the handler through request extensions. Requests without a live session
/// are rejected before any handler logic runs.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match jar.get(&config().auth.session_cookie_name) {
        Some(cookie) => state.sessions.get(cookie.value()).await,
        None => None,
    };

    match principal {
        Some(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authorized" })),
        )
            .into_response(),
    }
}

/// Session lookup for public endpoints that adapt to an optional login.
pub async fn current_principal(state: &AppState, jar: &CookieJar) -> Option<Principal> {
    let cookie = jar.get(&config().auth.session_cookie_name)?;
    state.sessions.get(cookie.value()).await
}
