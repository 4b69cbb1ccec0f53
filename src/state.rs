use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::database::listings::{ListingStore, PgListingRepository};
use crate::database::users::UserRepository;
use crate::services::ListingService;
use crate::storage::PhotoStore;

/// Everything the handlers need, injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub sessions: SessionStore,
    pub listings: ListingService,
}

impl AppState {
    pub fn new(pool: PgPool, photos: Arc<dyn PhotoStore>, config: &AppConfig) -> Self {
        let store: Arc<dyn ListingStore> = Arc::new(PgListingRepository::new(pool.clone()));
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionStore::new(config.auth.session_ttl_hours),
            listings: ListingService::new(store, photos, config.uploads.max_files_per_listing),
            pool,
        }
    }
}
