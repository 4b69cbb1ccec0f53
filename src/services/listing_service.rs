use std::sync::Arc;

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::listings::ListingStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Listing, ListingPatch, NewListing};
use crate::services::ownership::{authorize, Access};
use crate::storage::{PhotoStore, RemoveOutcome, StorageError};

/// One uploaded file as received from the multipart boundary.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub original_name: String,
}

/// Result of a mutation whose file cleanup is best-effort. A warning means
/// cleanup was attempted and failed; the mutation itself still succeeded.
#[derive(Debug, Clone, Default)]
pub struct MutationOutcome {
    pub cleanup_warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("{0}")]
    Validation(String),

    #[error("You do not own this property")]
    Forbidden,

    #[error("Property not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Persistence(DatabaseError),
}

impl From<DatabaseError> for ListingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ListingError::NotFound,
            DatabaseError::InvalidInput(msg) => ListingError::Validation(msg),
            other => ListingError::Persistence(other),
        }
    }
}

/// Orchestrates the listing lifecycle over the repository and the photo
/// store.
///
/// Ordering is the load-bearing part: files are written before the row
/// references them, and removed only after the row no longer does. The DB
/// never points at a file that was not durably saved; the inverse failure
/// (an orphaned unreferenced file) is accepted and logged.
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ListingStore>,
    photos: Arc<dyn PhotoStore>,
    max_files: usize,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>, photos: Arc<dyn PhotoStore>, max_files: usize) -> Self {
        Self { store, photos, max_files }
    }

    /// Create a listing from validated input plus at least one photo.
    pub async fn create(
        &self,
        principal: &Principal,
        fields: NewListing,
        files: Vec<UploadedFile>,
    ) -> Result<Listing, ListingError> {
        if fields.title.trim().is_empty() {
            return Err(ListingError::Validation("Title is required".to_string()));
        }
        if files.is_empty() {
            return Err(ListingError::Validation(
                "You must upload at least one photo".to_string(),
            ));
        }
        self.check_file_count(&files)?;

        let refs = self.save_all(&files).await?;

        match self.store.create(principal.user_id, fields, &refs).await {
            Ok(listing) => Ok(listing),
            Err(err) => {
                // The row never landed; retire the files we just wrote
                self.retire_files(&refs).await;
                Err(err.into())
            }
        }
    }

    /// Update scalar fields and/or replace the photo set wholesale.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ListingPatch,
        files: Vec<UploadedFile>,
    ) -> Result<MutationOutcome, ListingError> {
        let listing = self
            .store
            .get_by_id(id)
            .await
            .map_err(ListingError::from)?
            .ok_or(ListingError::NotFound)?;

        if authorize(principal, &listing) == Access::Forbidden {
            return Err(ListingError::Forbidden);
        }
        if patch.is_empty() && files.is_empty() {
            return Err(ListingError::Validation(
                "Nothing to update: supply at least one field or photo".to_string(),
            ));
        }
        self.check_file_count(&files)?;

        if files.is_empty() {
            self.store.update(id, patch, None).await?;
            return Ok(MutationOutcome::default());
        }

        let new_refs = self.save_all(&files).await?;
        if let Err(err) = self.store.update(id, patch, Some(&new_refs)).await {
            self.retire_files(&new_refs).await;
            return Err(err.into());
        }

        // Old files go away only once the row stopped referencing them
        let cleanup_warnings = self.retire_files(&listing.photos).await;
        Ok(MutationOutcome { cleanup_warnings })
    }

    /// Delete a listing and retire its photo files.
    pub async fn delete(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<MutationOutcome, ListingError> {
        let listing = self
            .store
            .get_by_id(id)
            .await
            .map_err(ListingError::from)?
            .ok_or(ListingError::NotFound)?;

        if authorize(principal, &listing) == Access::Forbidden {
            return Err(ListingError::Forbidden);
        }

        let previous_refs = self.store.delete(id).await?;
        let cleanup_warnings = self.retire_files(&previous_refs).await;
        Ok(MutationOutcome { cleanup_warnings })
    }

    /// All listings, newest first, with the owner's display name.
    pub async fn list(&self) -> Result<Vec<(Listing, String)>, ListingError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Listing>, ListingError> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Owner's phone for the contact view; 404s are the caller's concern.
    pub async fn contact_phone(&self, id: Uuid) -> Result<String, ListingError> {
        match self.store.owner_phone(id).await? {
            None => Err(ListingError::NotFound),
            Some(phone) => Ok(phone.unwrap_or_else(|| "No phone provided".to_string())),
        }
    }

    fn check_file_count(&self, files: &[UploadedFile]) -> Result<(), ListingError> {
        if files.len() > self.max_files {
            return Err(ListingError::Validation(format!(
                "At most {} photos per listing",
                self.max_files
            )));
        }
        Ok(())
    }

    /// Save every file in upload order. If one save fails, the ones already
    /// written are retired before the error surfaces.
    async fn save_all(&self, files: &[UploadedFile]) -> Result<Vec<String>, ListingError> {
        let mut refs = Vec::with_capacity(files.len());
        for file in files {
            match self.photos.save(&file.bytes, &file.original_name).await {
                Ok(reference) => refs.push(reference),
                Err(err) => {
                    self.retire_files(&refs).await;
                    return Err(ListingError::Storage(err));
                }
            }
        }
        Ok(refs)
    }

    /// Best-effort removal of a batch of references. Failures are logged and
    /// reported as warnings, never as request failure.
    async fn retire_files(&self, refs: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();
        for reference in refs {
            if let RemoveOutcome::Failed(reason) = self.photos.remove(reference).await {
                warn!(reference = %reference, reason = %reason, "failed to remove photo file");
                warnings.push(format!("{}: {}", reference, reason));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryListingStore, MemoryPhotoStore};
    use rust_decimal::Decimal;

    fn principal() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            username: "asha".to_string(),
        }
    }

    fn service(
        store: Arc<MemoryListingStore>,
        photos: Arc<MemoryPhotoStore>,
    ) -> ListingService {
        ListingService::new(store, photos, 10)
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            bytes: b"image-bytes".to_vec(),
            original_name: name.to_string(),
        }
    }

    fn fields(title: &str) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: Some("Two bedrooms".to_string()),
            price: Some(Decimal::new(75_000_00, 2)),
            city: Some("Kochi".to_string()),
        }
    }

    #[tokio::test]
    async fn create_saves_one_reference_per_file() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let listing = svc
            .create(&principal(), fields("Sea View"), vec![file("a.jpg"), file("b.png")])
            .await
            .unwrap();

        assert_eq!(listing.photos.len(), 2);
        assert!(listing.photos[0].ends_with(".jpg"));
        assert!(listing.photos[1].ends_with(".png"));
        assert_eq!(photos.saved(), listing.photos);

        let stored = store.get(listing.property_id).unwrap();
        assert_eq!(stored.photos, listing.photos);
    }

    #[tokio::test]
    async fn create_without_photos_is_rejected_before_any_side_effect() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let err = svc
            .create(&principal(), fields("Sea View"), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Validation(_)));
        assert!(photos.saved().is_empty());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn create_without_title_is_rejected() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store, photos.clone());

        let err = svc
            .create(&principal(), fields("  "), vec![file("a.jpg")])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Validation(_)));
        assert!(photos.saved().is_empty());
    }

    #[tokio::test]
    async fn create_compensates_saved_files_when_insert_fails() {
        let store = Arc::new(MemoryListingStore::new());
        store.fail_next_create();
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let err = svc
            .create(&principal(), fields("Sea View"), vec![file("a.jpg"), file("b.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Persistence(_)));
        assert_eq!(store.len(), 0);
        // Both files were written first, then retired
        assert_eq!(photos.saved().len(), 2);
        assert_eq!(photos.removed(), photos.saved());
        assert!(photos.existing().is_empty());
    }

    #[tokio::test]
    async fn mid_batch_save_failure_retires_earlier_files() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        photos.fail_saves_after(1);
        let svc = service(store.clone(), photos.clone());

        let err = svc
            .create(&principal(), fields("Sea View"), vec![file("a.jpg"), file("b.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Storage(_)));
        assert_eq!(store.len(), 0);
        assert_eq!(photos.saved().len(), 1);
        assert!(photos.existing().is_empty());
    }

    #[tokio::test]
    async fn update_by_non_owner_leaves_row_and_storage_untouched() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();
        let saved_before = photos.saved();

        let patch = ListingPatch {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let err = svc
            .update(&principal(), listing.property_id, patch, vec![file("evil.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Forbidden));
        let stored = store.get(listing.property_id).unwrap();
        assert_eq!(stored.title, "Sea View");
        assert_eq!(photos.saved(), saved_before);
        assert!(photos.removed().is_empty());
    }

    #[tokio::test]
    async fn update_with_no_fields_and_no_files_is_rejected() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();

        let err = svc
            .update(&owner, listing.property_id, ListingPatch::default(), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Validation(_)));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn update_replaces_photo_set_and_retires_old_files() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();
        let old_ref = listing.photos[0].clone();

        let outcome = svc
            .update(&owner, listing.property_id, ListingPatch::default(), vec![file("b.png")])
            .await
            .unwrap();

        assert!(outcome.cleanup_warnings.is_empty());
        let stored = store.get(listing.property_id).unwrap();
        assert_eq!(stored.photos.len(), 1);
        assert!(stored.photos[0].ends_with(".png"));
        // Full replacement, never a merge
        assert!(!stored.photos.contains(&old_ref));
        assert!(!photos.exists(&old_ref));
    }

    #[tokio::test]
    async fn update_scalar_fields_only_keeps_photo_set() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();

        let patch = ListingPatch {
            price: Some(Decimal::new(90_000_00, 2)),
            ..Default::default()
        };
        svc.update(&owner, listing.property_id, patch, vec![])
            .await
            .unwrap();

        let stored = store.get(listing.property_id).unwrap();
        assert_eq!(stored.price, Some(Decimal::new(90_000_00, 2)));
        assert_eq!(stored.photos, listing.photos);
        assert!(photos.removed().is_empty());
    }

    #[tokio::test]
    async fn update_failure_compensates_new_files_and_keeps_old_ones() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();
        let old_ref = listing.photos[0].clone();

        store.fail_next_update();
        let err = svc
            .update(&owner, listing.property_id, ListingPatch::default(), vec![file("b.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, ListingError::Persistence(_)));
        // The new file was retired; the referenced old file is untouched
        assert!(photos.exists(&old_ref));
        assert_eq!(photos.existing().len(), 1);
        let stored = store.get(listing.property_id).unwrap();
        assert_eq!(stored.photos, vec![old_ref]);
    }

    #[tokio::test]
    async fn delete_removes_row_then_attempts_every_file() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg"), file("b.png")])
            .await
            .unwrap();

        let outcome = svc.delete(&owner, listing.property_id).await.unwrap();

        assert!(outcome.cleanup_warnings.is_empty());
        assert!(store.get(listing.property_id).is_none());
        assert_eq!(photos.removed(), listing.photos);
        assert!(photos.existing().is_empty());
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_file_cleanup_fails() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();

        photos.fail_removes();
        let outcome = svc.delete(&owner, listing.property_id).await.unwrap();

        // The logical delete won; the orphan file is a warning, not an error
        assert_eq!(outcome.cleanup_warnings.len(), 1);
        assert!(store.get(listing.property_id).is_none());
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let listing = svc
            .create(&principal(), fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();

        let err = svc.delete(&principal(), listing.property_id).await.unwrap_err();
        assert!(matches!(err, ListingError::Forbidden));
        assert!(store.get(listing.property_id).is_some());
        assert!(photos.removed().is_empty());
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store, photos);

        let err = svc
            .update(&principal(), Uuid::new_v4(), ListingPatch::default(), vec![file("a.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::NotFound));

        let err = svc.delete(&principal(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound));
    }

    #[tokio::test]
    async fn contact_phone_falls_back_when_owner_has_none() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos);

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();

        assert_eq!(
            svc.contact_phone(listing.property_id).await.unwrap(),
            "No phone provided"
        );
        assert!(matches!(
            svc.contact_phone(Uuid::new_v4()).await.unwrap_err(),
            ListingError::NotFound
        ));
    }

    #[tokio::test]
    async fn lifecycle_create_update_delete_keeps_files_consistent() {
        let store = Arc::new(MemoryListingStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let svc = service(store.clone(), photos.clone());

        let owner = principal();
        let listing = svc
            .create(&owner, fields("Sea View"), vec![file("a.jpg")])
            .await
            .unwrap();
        let first_ref = listing.photos[0].clone();
        assert!(photos.exists(&first_ref));

        svc.update(&owner, listing.property_id, ListingPatch::default(), vec![file("b.png")])
            .await
            .unwrap();
        let second_ref = store.get(listing.property_id).unwrap().photos[0].clone();
        assert!(!photos.exists(&first_ref));
        assert!(photos.exists(&second_ref));

        svc.delete(&owner, listing.property_id).await.unwrap();
        assert!(store.get(listing.property_id).is_none());
        assert!(!photos.exists(&second_ref));
    }
}
