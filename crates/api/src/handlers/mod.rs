pub mod auth;
pub mod bookings;
pub mod listings;
pub mod reviews;
