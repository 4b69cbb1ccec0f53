// handlers/protected/properties.rs - owner-gated listing mutations
use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{ListingPatch, NewListing};
use crate::error::ApiError;
use crate::services::UploadedFile;
use crate::state::AppState;

/// Scalar fields and photo payloads pulled out of one multipart request.
#[derive(Debug, Default)]
struct ListingForm {
    title: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    city: Option<String>,
    files: Vec<UploadedFile>,
}

/// Drain a multipart body into a [`ListingForm`]. Blank scalar fields count
/// as absent, matching the form the browser submits.
async fn parse_listing_form(mut multipart: Multipart) -> Result<ListingForm, ApiError> {
    let mut form = ListingForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "photos" => {
                let original_name = field.file_name().unwrap_or("photo").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                form.files.push(UploadedFile {
                    bytes: bytes.to_vec(),
                    original_name,
                });
            }
            "title" => form.title = text_field(field).await?,
            "description" => form.description = text_field(field).await?,
            "city" => form.city = text_field(field).await?,
            "price" => {
                if let Some(text) = text_field(field).await? {
                    let price = text
                        .parse::<Decimal>()
                        .map_err(|_| ApiError::Validation("Invalid price".to_string()))?;
                    form.price = Some(price);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, ApiError> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let text = text.trim().to_string();
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn parse_property_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid property id".to_string()))
}

/// POST /api/properties/add - create a listing with 1..N photos
pub async fn add(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = parse_listing_form(multipart).await?;

    let fields = NewListing {
        title: form.title.unwrap_or_default(),
        description: form.description,
        price: form.price,
        city: form.city,
    };

    let listing = state.listings.create(&principal, fields, form.files).await?;
    info!(property_id = %listing.property_id, owner_id = %listing.owner_id, "listing created");

    Ok(Json(json!({
        "success": true,
        "property_id": listing.property_id,
        "photos": listing.photos,
    })))
}

/// PUT /api/properties/:id - owner-only partial update; new photos replace
/// the whole set
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let id = parse_property_id(&id)?;
    let form = parse_listing_form(multipart).await?;

    let patch = ListingPatch {
        title: form.title,
        description: form.description,
        price: form.price,
        city: form.city,
    };

    state.listings.update(&principal, id, patch, form.files).await?;
    info!(property_id = %id, "listing updated");

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/properties/:id - owner-only delete, retiring photo files
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_property_id(&id)?;

    state.listings.delete(&principal, id).await?;
    info!(property_id = %id, "listing deleted");

    Ok(Json(json!({ "success": true })))
}

/// GET /api/property/:id/contact - owner's phone, login required
pub async fn contact(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_property_id(&id)?;

    let phone = state.listings.contact_phone(id).await?;
    Ok(Json(json!({ "phone": phone })))
}
