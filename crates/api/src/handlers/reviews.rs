//! Handlers for the `/reviews` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use staybook_core::error::CoreError;
use staybook_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use staybook_core::review::{
    ensure_first_review, validate_comment, validate_rating, validate_review_booking,
};
use staybook_core::types::EntityId;
use staybook_db::models::review::{CreateReview, Review, UpdateReview};
use staybook_db::repositories::{BookingRepo, ListingRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ReviewListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a review the caller wrote. Other users get 403.
async fn ensure_own_review(state: &AppState, id: EntityId, auth: &AuthUser) -> AppResult<Review> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Review", id)))?;
    if review.reviewer_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the reviewer can modify this review".into(),
        )));
    }
    Ok(review)
}

/// GET /api/v1/reviews?listing_id=
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let reviews = ReviewRepo::list(&state.pool, params.listing_id, limit, offset).await?;

    Ok(Json(DataResponse { data: reviews }))
}

/// POST /api/v1/reviews
///
/// One review per listing per reviewer. A cited booking must be the
/// caller's own completed stay at that listing.
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReview>,
) -> AppResult<impl IntoResponse> {
    validate_rating(input.rating)?;
    validate_comment(&input.comment)?;

    let listing = ListingRepo::find_by_id(&state.pool, input.listing_id)
        .await?
        .ok_or_else(|| CoreError::invalid_field("listing_id", "Listing not found."))?;

    let already_reviewed = ReviewRepo::exists_for(&state.pool, listing.id, auth.user_id).await?;
    ensure_first_review(already_reviewed)?;

    if let Some(booking_id) = input.booking_id {
        let booking = BookingRepo::find_by_id(&state.pool, booking_id)
            .await?
            .ok_or_else(|| CoreError::invalid_field("booking_id", "Booking not found."))?;
        validate_review_booking(&booking.to_reviewed_booking()?, listing.id, auth.user_id)?;
    }

    // A concurrent duplicate that slips past the pre-check hits the
    // uq_reviews_listing_reviewer constraint and surfaces as 409.
    let review = ReviewRepo::create(&state.pool, &input, auth.user_id).await?;

    tracing::info!(
        review_id = %review.id,
        listing_id = %listing.id,
        reviewer_id = auth.user_id,
        rating = review.rating,
        "Review created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Review", id)))?;

    Ok(Json(DataResponse { data: review }))
}

/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<impl IntoResponse> {
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }
    if let Some(comment) = &input.comment {
        validate_comment(comment)?;
    }

    ensure_own_review(&state, id, &auth).await?;

    let review = ReviewRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Review", id)))?;

    tracing::info!(review_id = %id, reviewer_id = auth.user_id, "Review updated");

    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    ensure_own_review(&state, id, &auth).await?;

    ReviewRepo::delete(&state.pool, id).await?;

    tracing::info!(review_id = %id, reviewer_id = auth.user_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
