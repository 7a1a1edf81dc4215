//! Domain rules for Staybook.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! call into these modules so that the same rules apply to API writes and to
//! the seeding tool.

pub mod booking;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod password;
pub mod review;
pub mod types;
