// handlers/public/users.rs - GET /api/users directory
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::format::user_view;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/users - registered users, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.users.list_users().await?;

    let views: Vec<Value> = users.into_iter().map(user_view).collect();
    Ok(Json(json!({ "users": views })))
}
