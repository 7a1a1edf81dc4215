//! Development data seeding for Staybook.
//!
//! [`run`] fills a migrated database with fixture users and random listings,
//! bookings and reviews. Generated bookings pass through the same overlap
//! validator and guarded insert as API writes, and generated reviews respect
//! the one-review-per-listing rule, so a seeded database satisfies every
//! invariant the API enforces.

pub mod error;
pub mod fixtures;
pub mod seeder;

pub use error::SeedError;
pub use seeder::{run, SeedOptions, SeedReport};
