pub mod listing_service;
pub mod ownership;

pub use listing_service::{ListingError, ListingService, MutationOutcome, UploadedFile};
pub use ownership::{authorize, Access};
