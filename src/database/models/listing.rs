use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::photos;

/// A property listing with the photo column decoded into an ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw `properties` row; the photo column stays serialized until it crosses
/// the repository boundary.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
    pub photos: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            property_id: row.property_id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            price: row.price,
            city: row.city,
            photos: photos::normalize_refs(row.photos.as_deref()),
            created_at: row.created_at,
        }
    }
}

/// `properties` joined with the owner's display name, for the browse view.
#[derive(Debug, Clone, FromRow)]
pub struct ListingOwnerRow {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
    pub photos: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
}

/// Fields accepted when creating a listing.
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
}

/// Partial update: `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub city: Option<String>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.city.is_none()
    }
}
