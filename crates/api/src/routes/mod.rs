pub mod auth;
pub mod bookings;
pub mod health;
pub mod listings;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register, /auth/login, /auth/me
///
/// /listings                              list, create
/// /listings/{id}                         get, update, delete
/// /listings/{id}/availability            date-range check
/// /listings/{id}/reviews                 reviews of one listing
///
/// /bookings                              caller's bookings, create
/// /bookings/{id}                         get, update, delete
/// /bookings/{id}/status                  status transition
///
/// /reviews                               list (?listing_id=), create
/// /reviews/{id}                          get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/listings", listings::router())
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
}
