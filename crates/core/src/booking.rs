//! Booking rules: status machine, stay intervals, and the overlap &
//! availability validator.
//!
//! A stay occupies the half-open interval `[check_in, check_out)`: the
//! check-out day is free for the next guest to check in. Two stays overlap
//! iff `a.check_in < b.check_out && a.check_out > b.check_in`. Cancelled
//! bookings never occupy dates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, EntityId};

/* --------------------------------------------------------------------------
Status
-------------------------------------------------------------------------- */

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// All valid status strings, in lifecycle order.
pub const VALID_BOOKING_STATUSES: &[&str] = &["pending", "confirmed", "cancelled", "completed"];

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether a booking in this state holds its dates against other bookings.
    pub const fn occupies_dates(self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// Whether dates and guest count may still be edited.
    pub const fn is_editable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Allowed transitions: pending -> confirmed | cancelled,
    /// confirmed -> completed | cancelled. Terminal states never move.
    pub const fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(CoreError::invalid_field(
                "status",
                format!(
                    "Invalid booking status '{other}'. Must be one of: {}",
                    VALID_BOOKING_STATUSES.join(", ")
                ),
            )),
        }
    }
}

/* --------------------------------------------------------------------------
Intervals
-------------------------------------------------------------------------- */

/// A validated `[check_in, check_out)` stay. Always at least one night long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayInterval {
    check_in: Date,
    check_out: Date,
}

impl StayInterval {
    /// Build an interval, rejecting `check_out <= check_in`.
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, BookingRejection> {
        if check_out <= check_in {
            return Err(BookingRejection::InvalidDateRange);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> Date {
        self.check_in
    }

    pub fn check_out(&self) -> Date {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps(&self, other: &StayInterval) -> bool {
        dates_overlap(self.check_in, self.check_out, other.check_in, other.check_out)
    }
}

/// Half-open overlap test on raw dates.
pub fn dates_overlap(a_in: Date, a_out: Date, b_in: Date, b_out: Date) -> bool {
    a_in < b_out && a_out > b_in
}

/// The slice of an existing booking the overlap check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedStay {
    pub booking_id: EntityId,
    pub check_in: Date,
    pub check_out: Date,
    pub status: BookingStatus,
}

/// Return the first stored booking that blocks `proposed`.
///
/// Cancelled bookings and the booking named by `exclude` (the one being
/// edited) are ignored.
pub fn find_conflict<'a>(
    proposed: &StayInterval,
    existing: &'a [BookedStay],
    exclude: Option<EntityId>,
) -> Option<&'a BookedStay> {
    existing.iter().find(|stay| {
        stay.status.occupies_dates()
            && Some(stay.booking_id) != exclude
            && dates_overlap(
                stay.check_in,
                stay.check_out,
                proposed.check_in,
                proposed.check_out,
            )
    })
}

/* --------------------------------------------------------------------------
Validator
-------------------------------------------------------------------------- */

/// Why a candidate booking may not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingRejection {
    #[error("Check-out date must be after check-in date.")]
    InvalidDateRange,

    #[error("Check-in date cannot be in the past.")]
    CheckInInPast,

    #[error("This listing is not available for booking.")]
    ListingUnavailable,

    #[error("At least one guest is required.")]
    NoGuests,

    #[error("Number of guests ({requested}) exceeds maximum allowed ({max}).")]
    CapacityExceeded { requested: i64, max: i64 },

    #[error("These dates are not available. Please choose different dates.")]
    DatesUnavailable,
}

impl BookingRejection {
    /// The request field the rejection is reported against.
    pub const fn field(&self) -> &'static str {
        match self {
            BookingRejection::InvalidDateRange => "check_out_date",
            BookingRejection::CheckInInPast | BookingRejection::DatesUnavailable => {
                "check_in_date"
            }
            BookingRejection::ListingUnavailable => "listing_id",
            BookingRejection::NoGuests | BookingRejection::CapacityExceeded { .. } => {
                "number_of_guests"
            }
        }
    }
}

impl From<BookingRejection> for CoreError {
    fn from(rejection: BookingRejection) -> Self {
        CoreError::invalid_field(rejection.field(), rejection.to_string())
    }
}

/// Listing facts the validator needs.
#[derive(Debug, Clone, Copy)]
pub struct ListingCapacity {
    pub max_guests: i64,
    pub is_available: bool,
}

/// A proposed booking (new, or an edit of `exclude`).
#[derive(Debug, Clone, Copy)]
pub struct BookingCandidate {
    pub check_in: Date,
    pub check_out: Date,
    pub number_of_guests: i64,
    /// Id of the booking being edited; its own dates never conflict.
    pub exclude: Option<EntityId>,
    /// Earliest allowed check-in, if any (today for API creates).
    pub earliest_check_in: Option<Date>,
}

/// Which parts of a booking a write touches.
///
/// A new booking touches everything. An edit that keeps its dates skips the
/// listing's availability flag, and one that keeps its party size skips the
/// capacity check, so a host closing a listing or lowering `max_guests` does
/// not freeze edits to bookings already made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingChanges {
    pub dates: bool,
    pub guests: bool,
}

impl BookingChanges {
    pub const ALL: BookingChanges = BookingChanges {
        dates: true,
        guests: true,
    };
}

/// Decide whether `candidate` may be stored against `listing`.
///
/// Checks run in a fixed order and the first failure wins:
/// date order, earliest check-in, listing availability, guest count,
/// capacity, and finally overlap with `existing`.
pub fn validate_booking(
    candidate: &BookingCandidate,
    listing: ListingCapacity,
    existing: &[BookedStay],
) -> Result<StayInterval, BookingRejection> {
    validate_booking_change(candidate, BookingChanges::ALL, listing, existing)
}

/// [`validate_booking`] for a write that may only touch part of a booking.
///
/// Availability is checked only when `changes.dates` is set and guest count
/// and capacity only when `changes.guests` is set. Date order, the earliest
/// check-in and overlap are always checked.
pub fn validate_booking_change(
    candidate: &BookingCandidate,
    changes: BookingChanges,
    listing: ListingCapacity,
    existing: &[BookedStay],
) -> Result<StayInterval, BookingRejection> {
    let interval = StayInterval::new(candidate.check_in, candidate.check_out)?;

    if let Some(earliest) = candidate.earliest_check_in {
        if interval.check_in < earliest {
            return Err(BookingRejection::CheckInInPast);
        }
    }

    if changes.dates && !listing.is_available {
        return Err(BookingRejection::ListingUnavailable);
    }

    if changes.guests {
        validate_guest_count(candidate.number_of_guests, listing.max_guests)?;
    }

    if find_conflict(&interval, existing, candidate.exclude).is_some() {
        return Err(BookingRejection::DatesUnavailable);
    }

    Ok(interval)
}

/// Guest count must be in `[1, max_guests]`.
pub fn validate_guest_count(requested: i64, max_guests: i64) -> Result<(), BookingRejection> {
    if requested < 1 {
        return Err(BookingRejection::NoGuests);
    }
    if requested > max_guests {
        return Err(BookingRejection::CapacityExceeded {
            requested,
            max: max_guests,
        });
    }
    Ok(())
}

/// Price of a stay in cents.
pub fn total_price_cents(
    price_per_night_cents: i64,
    interval: &StayInterval,
) -> Result<i64, CoreError> {
    price_per_night_cents
        .checked_mul(interval.nights())
        .ok_or_else(|| CoreError::invalid_field("total_price_cents", "Total price is too large."))
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
