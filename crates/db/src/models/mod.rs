//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` create / update DTOs for request payloads (update DTOs
//!   have all-`Option` fields)

pub mod booking;
pub mod listing;
pub mod review;
pub mod user;
