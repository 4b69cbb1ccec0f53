// handlers/public/properties.rs - GET /api/properties browse view
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::format::listing_view;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/properties - all listings, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let listings = state.listings.list().await?;

    let views: Vec<_> = listings
        .into_iter()
        .map(|(listing, owner_name)| listing_view(listing, owner_name))
        .collect();

    Ok(Json(json!({ "properties": views })))
}
