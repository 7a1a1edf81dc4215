//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.
//!
//! Password hashing lives in `staybook_core::password` so the seeding tool
//! can create users with the same scheme.

pub mod jwt;
