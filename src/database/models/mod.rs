pub mod listing;
pub mod user;

pub use listing::{Listing, ListingOwnerRow, ListingPatch, ListingRow, NewListing};
pub use user::{UserRecord, UserWithAuthRow};
