//! Handlers for the `/bookings` resource.
//!
//! Every write runs the booking validator against the listing's stored
//! bookings first, then hands the row to a guarded repository write that
//! re-checks overlap atomically. Losing that race surfaces as the same
//! "dates unavailable" field error the validator would have produced.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use staybook_core::booking::{
    total_price_cents, validate_booking, validate_booking_change, BookedStay, BookingCandidate,
    BookingChanges, BookingRejection, BookingStatus,
};
use staybook_core::error::CoreError;
use staybook_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use staybook_core::types::EntityId;
use staybook_db::models::booking::{
    Booking, CreateBooking, NewBooking, RescheduleBooking, UpdateBooking, UpdateBookingStatus,
};
use staybook_db::models::listing::Listing;
use staybook_db::repositories::{BookingRepo, ListingRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a booking together with its listing, or fail with 404.
async fn load_with_listing(state: &AppState, id: EntityId) -> AppResult<(Booking, Listing)> {
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Booking", id)))?;
    let listing = ListingRepo::find_by_id(&state.pool, booking.listing_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Listing", booking.listing_id)))?;
    Ok((booking, listing))
}

async fn occupied_stays(state: &AppState, listing_id: EntityId) -> AppResult<Vec<BookedStay>> {
    let stays = BookingRepo::list_occupying(&state.pool, listing_id)
        .await?
        .iter()
        .map(Booking::to_booked_stay)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stays)
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/bookings
///
/// The caller's bookings as a guest, newest first.
pub async fn list_my_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let bookings = BookingRepo::list_for_guest(&state.pool, auth.user_id, limit, offset).await?;

    Ok(Json(DataResponse { data: bookings }))
}

/// POST /api/v1/bookings
///
/// Creates a `pending` booking for the caller. The total is computed from
/// the listing's nightly price.
pub async fn create_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let listing = ListingRepo::find_by_id(&state.pool, input.listing_id)
        .await?
        .ok_or_else(|| CoreError::invalid_field("listing_id", "Listing not found."))?;

    let existing = occupied_stays(&state, listing.id).await?;
    let candidate = BookingCandidate {
        check_in: input.check_in_date,
        check_out: input.check_out_date,
        number_of_guests: input.number_of_guests,
        exclude: None,
        earliest_check_in: Some(Utc::now().date_naive()),
    };
    let interval =
        validate_booking(&candidate, listing.capacity(), &existing).map_err(CoreError::from)?;
    let total = total_price_cents(listing.price_per_night_cents, &interval)?;

    let new_booking = NewBooking {
        listing_id: listing.id,
        guest_id: auth.user_id,
        check_in_date: interval.check_in(),
        check_out_date: interval.check_out(),
        number_of_guests: input.number_of_guests,
        total_price_cents: total,
        status: BookingStatus::Pending,
        special_requests: input.special_requests,
    };

    let booking = BookingRepo::create_if_available(&state.pool, &new_booking)
        .await?
        .ok_or_else(|| CoreError::from(BookingRejection::DatesUnavailable))?;

    tracing::info!(
        booking_id = %booking.id,
        listing_id = %listing.id,
        guest_id = auth.user_id,
        check_in = %booking.check_in_date,
        check_out = %booking.check_out_date,
        total_price_cents = booking.total_price_cents,
        "Booking created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// GET /api/v1/bookings/{id}
///
/// Visible to the guest and to the listing's host.
pub async fn get_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let (booking, listing) = load_with_listing(&state, id).await?;

    if booking.guest_id != auth.user_id && listing.host_id != auth.user_id {
        return Err(forbidden("You do not have access to this booking"));
    }

    Ok(Json(DataResponse { data: booking }))
}

/// PUT /api/v1/bookings/{id}
///
/// The guest may move dates, change the party size or edit special requests
/// while the booking is pending or confirmed. The booking's own dates never
/// count as a conflict. The listing's availability flag only applies when the
/// dates move and its capacity only when the party size changes.
pub async fn update_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateBooking>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let (booking, listing) = load_with_listing(&state, id).await?;
    if booking.guest_id != auth.user_id {
        return Err(forbidden("Only the guest can change this booking"));
    }

    let status = booking.status()?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A {status} booking can no longer be changed"
        ))));
    }

    let check_in = input.check_in_date.unwrap_or(booking.check_in_date);
    let check_out = input.check_out_date.unwrap_or(booking.check_out_date);
    let number_of_guests = input.number_of_guests.unwrap_or(booking.number_of_guests);

    // Moving the check-in is held to the same "not in the past" rule as a
    // new booking; keeping it does not re-trigger the check.
    let earliest_check_in =
        (check_in != booking.check_in_date).then(|| Utc::now().date_naive());
    let changes = BookingChanges {
        dates: check_in != booking.check_in_date || check_out != booking.check_out_date,
        guests: number_of_guests != booking.number_of_guests,
    };

    let existing = occupied_stays(&state, listing.id).await?;
    let candidate = BookingCandidate {
        check_in,
        check_out,
        number_of_guests,
        exclude: Some(booking.id),
        earliest_check_in,
    };
    let interval = validate_booking_change(&candidate, changes, listing.capacity(), &existing)
        .map_err(CoreError::from)?;

    let change = RescheduleBooking {
        check_in_date: interval.check_in(),
        check_out_date: interval.check_out(),
        number_of_guests,
        total_price_cents: total_price_cents(listing.price_per_night_cents, &interval)?,
        special_requests: input.special_requests.or(booking.special_requests),
    };

    let updated = BookingRepo::reschedule_if_available(&state.pool, id, &change)
        .await?
        .ok_or_else(|| CoreError::from(BookingRejection::DatesUnavailable))?;

    tracing::info!(
        booking_id = %id,
        guest_id = auth.user_id,
        check_in = %updated.check_in_date,
        check_out = %updated.check_out_date,
        "Booking updated",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/bookings/{id}/status
///
/// Hosts confirm and complete; guests and hosts may cancel.
pub async fn update_booking_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateBookingStatus>,
) -> AppResult<impl IntoResponse> {
    let next: BookingStatus = input.status.parse()?;
    let (booking, listing) = load_with_listing(&state, id).await?;

    let is_guest = booking.guest_id == auth.user_id;
    let is_host = listing.host_id == auth.user_id;
    if !is_guest && !is_host {
        return Err(forbidden("You do not have access to this booking"));
    }

    let current = booking.status()?;
    if !current.can_transition_to(next) {
        return Err(CoreError::invalid_field(
            "status",
            format!("Cannot change booking status from '{current}' to '{next}'."),
        )
        .into());
    }
    if matches!(next, BookingStatus::Confirmed | BookingStatus::Completed) && !is_host {
        return Err(forbidden("Only the host can confirm or complete a booking"));
    }

    let updated = BookingRepo::transition_status(&state.pool, id, current, next)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Booking status changed concurrently; reload and retry".into(),
            ))
        })?;

    tracing::info!(
        booking_id = %id,
        user_id = auth.user_id,
        from = %current,
        to = %next,
        "Booking status changed",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/bookings/{id}
pub async fn delete_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Booking", id)))?;
    if booking.guest_id != auth.user_id {
        return Err(forbidden("Only the guest can delete this booking"));
    }

    BookingRepo::delete(&state.pool, id).await?;

    tracing::info!(booking_id = %id, guest_id = auth.user_id, "Booking deleted");

    Ok(StatusCode::NO_CONTENT)
}
