//! In-memory stand-ins for the store seams, used by service-level tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::listings::ListingStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Listing, ListingPatch, NewListing};
use crate::storage::{PhotoStore, RemoveOutcome, StorageError};

/// Listing store over a plain Vec, with per-operation failure injection.
pub struct MemoryListingStore {
    listings: Mutex<Vec<Listing>>,
    update_calls: AtomicUsize,
    fail_next_create: AtomicBool,
    fail_next_update: AtomicBool,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(Vec::new()),
            update_calls: AtomicUsize::new(0),
            fail_next_create: AtomicBool::new(false),
            fail_next_update: AtomicBool::new(false),
        }
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: Uuid) -> Option<Listing> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.property_id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.listings.lock().unwrap().len()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn injected_failure() -> DatabaseError {
        DatabaseError::Sqlx(sqlx::Error::PoolClosed)
    }
}

impl Default for MemoryListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn create(
        &self,
        owner_id: Uuid,
        fields: NewListing,
        photo_refs: &[String],
    ) -> Result<Listing, DatabaseError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }

        let listing = Listing {
            property_id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            description: fields.description,
            price: fields.price,
            city: fields.city,
            photos: photo_refs.to_vec(),
            created_at: Utc::now(),
        };
        self.listings.lock().unwrap().push(listing.clone());
        Ok(listing)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Listing>, DatabaseError> {
        Ok(self.get(id))
    }

    async fn list_all(&self) -> Result<Vec<(Listing, String)>, DatabaseError> {
        let listings = self.listings.lock().unwrap();
        Ok(listings
            .iter()
            .rev()
            .map(|l| (l.clone(), "Test Owner".to_string()))
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ListingPatch,
        new_photo_refs: Option<&[String]>,
    ) -> Result<(), DatabaseError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }
        if patch.is_empty() && new_photo_refs.is_none() {
            return Err(DatabaseError::InvalidInput(
                "update requires at least one field or a new photo list".to_string(),
            ));
        }

        let mut listings = self.listings.lock().unwrap();
        let listing = listings
            .iter_mut()
            .find(|l| l.property_id == id)
            .ok_or_else(|| DatabaseError::NotFound("Property not found".to_string()))?;

        if let Some(title) = patch.title {
            listing.title = title;
        }
        if let Some(description) = patch.description {
            listing.description = Some(description);
        }
        if let Some(price) = patch.price {
            listing.price = Some(price);
        }
        if let Some(city) = patch.city {
            listing.city = Some(city);
        }
        if let Some(refs) = new_photo_refs {
            listing.photos = refs.to_vec();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let mut listings = self.listings.lock().unwrap();
        let index = listings
            .iter()
            .position(|l| l.property_id == id)
            .ok_or_else(|| DatabaseError::NotFound("Property not found".to_string()))?;
        Ok(listings.remove(index).photos)
    }

    async fn owner_phone(&self, id: Uuid) -> Result<Option<Option<String>>, DatabaseError> {
        Ok(self.get(id).map(|_| None))
    }
}

/// Photo store that tracks save/remove traffic without touching a disk.
pub struct MemoryPhotoStore {
    saved: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    existing: Mutex<Vec<String>>,
    fail_saves_after: Mutex<Option<usize>>,
    fail_removes: AtomicBool,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            existing: Mutex::new(Vec::new()),
            fail_saves_after: Mutex::new(None),
            fail_removes: AtomicBool::new(false),
        }
    }

    /// Let `n` saves succeed, then fail the rest.
    pub fn fail_saves_after(&self, n: usize) {
        *self.fail_saves_after.lock().unwrap() = Some(n);
    }

    pub fn fail_removes(&self) {
        self.fail_removes.store(true, Ordering::SeqCst);
    }

    /// Every reference ever saved, in save order.
    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }

    /// Every reference successfully removed, in removal order.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    /// References currently held (saved and not removed).
    pub fn existing(&self) -> Vec<String> {
        self.existing.lock().unwrap().clone()
    }

    pub fn exists(&self, reference: &str) -> bool {
        self.existing.lock().unwrap().iter().any(|r| r == reference)
    }
}

impl Default for MemoryPhotoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn save(&self, _bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        if let Some(limit) = *self.fail_saves_after.lock().unwrap() {
            if self.saved.lock().unwrap().len() >= limit {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_else(|| ".jpg".to_string());
        let reference = format!("/uploads/prop_{}{}", Uuid::new_v4(), ext);

        self.saved.lock().unwrap().push(reference.clone());
        self.existing.lock().unwrap().push(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> RemoveOutcome {
        if self.fail_removes.load(Ordering::SeqCst) {
            return RemoveOutcome::Failed("injected removal failure".to_string());
        }

        let mut existing = self.existing.lock().unwrap();
        match existing.iter().position(|r| r == reference) {
            Some(index) => {
                existing.remove(index);
                self.removed.lock().unwrap().push(reference.to_string());
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::Missing,
        }
    }
}
