// handlers/public/auth.rs - signup/login/logout/me
use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{self, Principal};
use crate::database::users::NewUser;
use crate::error::ApiError;
use crate::middleware::auth::current_principal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn required(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// POST /api/signup - create profile + credentials, start a session
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (Some(full_name), Some(email), Some(username), Some(password)) = (
        required(payload.full_name),
        required(payload.email),
        required(payload.username),
        required(payload.password),
    ) else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    let password_hash = auth::hash_password(&password)?;

    let record = state
        .users
        .create_user(NewUser {
            full_name,
            email,
            phone: payload.phone.filter(|p| !p.trim().is_empty()),
            country: payload.country.filter(|c| !c.trim().is_empty()),
            role: payload.role.filter(|r| !r.trim().is_empty()),
            username: username.clone(),
            password_hash,
        })
        .await?;

    info!(user_id = %record.user_id, "user signed up");

    let principal = Principal {
        user_id: record.user_id,
        full_name: record.full_name,
        email: record.email,
        username,
    };
    let token = state.sessions.insert(principal).await;

    Ok((
        jar.add(auth::session_cookie(token)),
        Json(json!({ "success": true })),
    ))
}

/// POST /api/login - verify credentials, start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (Some(username), Some(password)) = (required(payload.username), required(payload.password))
    else {
        return Err(ApiError::Validation("Missing username or password".to_string()));
    };

    let Some(credentials) = state.users.find_credentials(&username).await? else {
        return Err(ApiError::AuthenticationRequired("Invalid credentials".to_string()));
    };

    if !auth::verify_password(&password, &credentials.password_hash) {
        return Err(ApiError::AuthenticationRequired("Invalid credentials".to_string()));
    }

    let principal = Principal {
        user_id: credentials.user_id,
        full_name: credentials.full_name,
        email: credentials.email,
        username: credentials.username,
    };
    let token = state.sessions.insert(principal).await;

    Ok((
        jar.add(auth::session_cookie(token)),
        Json(json!({ "success": true })),
    ))
}

/// GET /api/logout - drop the session, clear the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    if let Some(cookie) = jar.get(&crate::config::config().auth.session_cookie_name) {
        state.sessions.remove(cookie.value()).await;
    }

    (
        jar.remove(auth::removal_cookie()),
        Json(json!({ "success": true })),
    )
}

/// GET /api/me - the current principal, or null when anonymous
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    match current_principal(&state, &jar).await {
        Some(principal) => Json(json!({ "user": principal })),
        None => Json(json!({ "user": null })),
    }
}
