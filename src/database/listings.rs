use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Listing, ListingOwnerRow, ListingPatch, ListingRow, NewListing};
use crate::database::photos;

const LISTING_COLUMNS: &str =
    "property_id, owner_id, title, description, price, city, photos, created_at";

/// Transactional CRUD over the `properties` table.
///
/// Every mutation runs inside a self-managed transaction: either the whole
/// row change commits or none of it does. Photo references cross this
/// boundary as ordered lists; the serialized column format never leaks out.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create(
        &self,
        owner_id: Uuid,
        fields: NewListing,
        photo_refs: &[String],
    ) -> Result<Listing, DatabaseError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Listing>, DatabaseError>;

    /// All listings, newest first, joined with the owner's display name.
    async fn list_all(&self) -> Result<Vec<(Listing, String)>, DatabaseError>;

    /// Rewrites only supplied fields. `new_photo_refs` fully replaces the
    /// stored photo list, never merges with it.
    async fn update(
        &self,
        id: Uuid,
        patch: ListingPatch,
        new_photo_refs: Option<&[String]>,
    ) -> Result<(), DatabaseError>;

    /// Removes the row and returns the photo references that were attached,
    /// so the caller can retire the corresponding files.
    async fn delete(&self, id: Uuid) -> Result<Vec<String>, DatabaseError>;

    /// Owner's phone for the contact endpoint. Outer `None` when the listing
    /// does not exist.
    async fn owner_phone(&self, id: Uuid) -> Result<Option<Option<String>>, DatabaseError>;
}

#[derive(Clone)]
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingRepository {
    async fn create(
        &self,
        owner_id: Uuid,
        fields: NewListing,
        photo_refs: &[String],
    ) -> Result<Listing, DatabaseError> {
        let property_id = Uuid::new_v4();
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO properties (property_id, owner_id, title, description, price, city, photos, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(property_id)
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.city)
        .bind(photos::encode_refs(photo_refs))
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Listing {
            property_id,
            owner_id,
            title: fields.title,
            description: fields.description,
            price: fields.price,
            city: fields.city,
            photos: photo_refs.to_vec(),
            created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Listing>, DatabaseError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM properties WHERE property_id = $1",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Listing::from))
    }

    async fn list_all(&self) -> Result<Vec<(Listing, String)>, DatabaseError> {
        let rows = sqlx::query_as::<_, ListingOwnerRow>(
            "SELECT p.property_id, p.owner_id, p.title, p.description, p.price, p.city,
                    p.photos, p.created_at, u.full_name AS owner_name
             FROM properties p
             JOIN user_details u ON u.user_id = p.owner_id
             ORDER BY p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let owner_name = row.owner_name.clone();
                let listing = Listing {
                    property_id: row.property_id,
                    owner_id: row.owner_id,
                    title: row.title,
                    description: row.description,
                    price: row.price,
                    city: row.city,
                    photos: photos::normalize_refs(row.photos.as_deref()),
                    created_at: row.created_at,
                };
                (listing, owner_name)
            })
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ListingPatch,
        new_photo_refs: Option<&[String]>,
    ) -> Result<(), DatabaseError> {
        if patch.is_empty() && new_photo_refs.is_none() {
            return Err(DatabaseError::InvalidInput(
                "update requires at least one field or a new photo list".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE properties SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(title) = &patch.title {
                assignments.push("title = ");
                assignments.push_bind_unseparated(title.clone());
            }
            if let Some(description) = &patch.description {
                assignments.push("description = ");
                assignments.push_bind_unseparated(description.clone());
            }
            if let Some(price) = patch.price {
                assignments.push("price = ");
                assignments.push_bind_unseparated(price);
            }
            if let Some(city) = &patch.city {
                assignments.push("city = ");
                assignments.push_bind_unseparated(city.clone());
            }
            if let Some(refs) = new_photo_refs {
                assignments.push("photos = ");
                assignments.push_bind_unseparated(photos::encode_refs(refs));
            }
        }
        query.push(" WHERE property_id = ");
        query.push_bind(id);

        let result = query.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Property not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> = sqlx::query_scalar(
            "DELETE FROM properties WHERE property_id = $1 RETURNING photos",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stored) = previous else {
            return Err(DatabaseError::NotFound("Property not found".to_string()));
        };

        tx.commit().await?;
        Ok(photos::normalize_refs(stored.as_deref()))
    }

    async fn owner_phone(&self, id: Uuid) -> Result<Option<Option<String>>, DatabaseError> {
        let phone: Option<Option<String>> = sqlx::query_scalar(
            "SELECT u.phone
             FROM properties p
             JOIN user_details u ON u.user_id = p.owner_id
             WHERE p.property_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(phone)
    }
}
