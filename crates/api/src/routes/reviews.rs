use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Review routes mounted at `/reviews`.
///
/// ```text
/// GET    /       -> list_reviews
/// POST   /       -> create_review
/// GET    /{id}   -> get_review
/// PUT    /{id}   -> update_review
/// DELETE /{id}   -> delete_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
}
