//! Handlers for the `/listings` resource.
//!
//! Anyone may browse listings; only the owning host may change or delete one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use staybook_core::booking::{find_conflict, BookingRejection, StayInterval};
use staybook_core::error::CoreError;
use staybook_core::listing::{validate_listing_numbers, validate_required_text};
use staybook_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use staybook_core::types::{Date, EntityId};
use staybook_db::models::listing::{CreateListing, Listing, UpdateListing};
use staybook_db::repositories::{BookingRepo, ListingRepo, ReviewRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AvailabilityParams, ListingSearchParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of an availability check.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub listing_id: EntityId,
    pub check_in: Date,
    pub check_out: Date,
    pub available: bool,
    /// Why the dates cannot be booked, when they can't.
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a listing or fail with 404.
async fn ensure_listing(state: &AppState, id: EntityId) -> AppResult<Listing> {
    ListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Listing", id)))
}

/// Load a listing the caller hosts. Other users get 403.
async fn ensure_hosted_by(state: &AppState, id: EntityId, auth: &AuthUser) -> AppResult<Listing> {
    let listing = ensure_listing(state, id).await?;
    if listing.host_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the host can modify this listing".into(),
        )));
    }
    Ok(listing)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/listings
///
/// Filters: `location` (substring), `available`, `min_guests`.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingSearchParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let listings = ListingRepo::list(&state.pool, &params.filter(), limit, offset).await?;

    Ok(Json(DataResponse { data: listings }))
}

/// POST /api/v1/listings
///
/// The caller becomes the host.
pub async fn create_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateListing>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_required_text("title", &input.title)?;
    validate_required_text("description", &input.description)?;
    validate_required_text("location", &input.location)?;
    validate_listing_numbers(
        Some(input.price_per_night_cents),
        Some(input.number_of_bedrooms),
        Some(input.number_of_bathrooms),
        Some(input.max_guests),
    )?;

    let listing = ListingRepo::create(&state.pool, &input, auth.user_id).await?;

    tracing::info!(
        listing_id = %listing.id,
        host_id = auth.user_id,
        title = %listing.title,
        "Listing created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: listing })))
}

/// GET /api/v1/listings/{id}
///
/// Includes `average_rating` and `total_reviews`.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingRepo::find_with_rating(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Listing", id)))?;

    Ok(Json(DataResponse { data: listing }))
}

/// PUT /api/v1/listings/{id}
///
/// Partial update; absent fields keep their value.
pub async fn update_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateListing>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    for (field, value) in [
        ("title", &input.title),
        ("description", &input.description),
        ("location", &input.location),
    ] {
        if let Some(value) = value {
            validate_required_text(field, value)?;
        }
    }
    validate_listing_numbers(
        input.price_per_night_cents,
        input.number_of_bedrooms,
        input.number_of_bathrooms,
        input.max_guests,
    )?;

    ensure_hosted_by(&state, id, &auth).await?;

    let listing = ListingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Listing", id)))?;

    tracing::info!(listing_id = %id, host_id = auth.user_id, "Listing updated");

    Ok(Json(DataResponse { data: listing }))
}

/// DELETE /api/v1/listings/{id}
///
/// Bookings and reviews of the listing are removed with it.
pub async fn delete_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    ensure_hosted_by(&state, id, &auth).await?;

    if !ListingRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("Listing", id)));
    }

    tracing::info!(listing_id = %id, host_id = auth.user_id, "Listing deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/listings/{id}/availability?check_in=&check_out=
///
/// Checks date order and overlap with stored bookings. An inverted range is
/// a 400; a taken range reports `available: false`.
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<Json<DataResponse<AvailabilityResponse>>> {
    ensure_listing(&state, id).await?;

    let interval = StayInterval::new(params.check_in, params.check_out).map_err(CoreError::from)?;

    let stays = BookingRepo::list_occupying(&state.pool, id)
        .await?
        .iter()
        .map(|b| b.to_booked_stay())
        .collect::<Result<Vec<_>, _>>()?;

    let conflict = find_conflict(&interval, &stays, None);

    Ok(Json(DataResponse {
        data: AvailabilityResponse {
            listing_id: id,
            check_in: interval.check_in(),
            check_out: interval.check_out(),
            available: conflict.is_none(),
            reason: conflict.map(|_| BookingRejection::DatesUnavailable.to_string()),
        },
    }))
}

/// GET /api/v1/listings/{id}/reviews
pub async fn list_listing_reviews(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_listing(&state, id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let reviews = ReviewRepo::list(&state.pool, Some(id), limit, offset).await?;

    Ok(Json(DataResponse { data: reviews }))
}
