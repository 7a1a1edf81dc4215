use axum::routing::{get, put};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Booking routes mounted at `/bookings`.
///
/// ```text
/// GET    /              -> list_my_bookings
/// POST   /              -> create_booking
/// GET    /{id}          -> get_booking
/// PUT    /{id}          -> update_booking
/// DELETE /{id}          -> delete_booking
/// PUT    /{id}/status   -> update_booking_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(bookings::list_my_bookings).post(bookings::create_booking),
        )
        .route(
            "/{id}",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/{id}/status", put(bookings::update_booking_status))
}
