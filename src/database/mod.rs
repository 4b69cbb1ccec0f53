pub mod listings;
pub mod manager;
pub mod models;
pub mod photos;
pub mod users;

pub use listings::{ListingStore, PgListingRepository};
pub use manager::DatabaseError;
pub use users::UserRepository;
