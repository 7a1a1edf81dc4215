use axum::routing::get;
use axum::Router;

use crate::handlers::listings;
use crate::state::AppState;

/// Listing routes mounted at `/listings`.
///
/// ```text
/// GET    /                    -> list_listings
/// POST   /                    -> create_listing
/// GET    /{id}                -> get_listing
/// PUT    /{id}                -> update_listing
/// DELETE /{id}                -> delete_listing
/// GET    /{id}/availability   -> check_availability
/// GET    /{id}/reviews        -> list_listing_reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/{id}",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/{id}/availability", get(listings::check_availability))
        .route("/{id}/reviews", get(listings::list_listing_reviews))
}
