//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod booking_repo;
pub mod listing_repo;
pub mod review_repo;
pub mod user_repo;

pub use booking_repo::BookingRepo;
pub use listing_repo::{ClearedRows, ListingRepo};
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
