//! Outbound view shaping for API responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{Listing, UserWithAuthRow};

/// Listing as the browse/detail endpoints return it: the row plus the
/// owner's display name and a preview photo.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
    pub preview_url: Option<String>,
}

pub fn listing_view(listing: Listing, owner_name: String) -> PropertyView {
    let preview_url = listing.photos.first().cloned();
    PropertyView {
        property_id: listing.property_id,
        owner_id: listing.owner_id,
        title: listing.title,
        description: listing.description,
        price: listing.price,
        city: listing.city,
        photos: listing.photos,
        created_at: listing.created_at,
        owner_name,
        preview_url,
    }
}

/// User directory entry with the credential sub-object when one exists.
pub fn user_view(row: UserWithAuthRow) -> Value {
    let auth = match (row.auth_id, row.username) {
        (Some(auth_id), Some(username)) => json!({ "auth_id": auth_id, "username": username }),
        _ => Value::Null,
    };

    json!({
        "user_id": row.user_id,
        "full_name": row.full_name,
        "email": row.email,
        "phone": row.phone,
        "country": row.country,
        "role": row.role,
        "created_at": row.created_at,
        "auth": auth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(photos: Vec<String>) -> Listing {
        Listing {
            property_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Sea View".to_string(),
            description: None,
            price: None,
            city: Some("Goa".to_string()),
            photos,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn preview_is_first_photo() {
        let view = listing_view(
            listing(vec!["/uploads/a.jpg".to_string(), "/uploads/b.png".to_string()]),
            "Asha Rao".to_string(),
        );
        assert_eq!(view.preview_url.as_deref(), Some("/uploads/a.jpg"));
        assert_eq!(view.owner_name, "Asha Rao");
    }

    #[test]
    fn preview_is_null_without_photos() {
        let view = listing_view(listing(vec![]), "Asha Rao".to_string());
        assert!(view.preview_url.is_none());
    }

    #[test]
    fn user_without_credentials_has_null_auth() {
        let view = user_view(UserWithAuthRow {
            user_id: Uuid::new_v4(),
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            country: None,
            role: "both".to_string(),
            created_at: Utc::now(),
            auth_id: None,
            username: None,
        });
        assert!(view["auth"].is_null());
    }
}
