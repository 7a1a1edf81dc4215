//! Booking models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staybook_core::booking::{BookedStay, BookingStatus};
use staybook_core::error::CoreError;
use staybook_core::review::ReviewedBooking;
use staybook_core::types::{Date, DbId, EntityId, Timestamp};
use validator::Validate;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: EntityId,
    pub listing_id: EntityId,
    pub guest_id: DbId,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub number_of_guests: i64,
    pub total_price_cents: i64,
    /// One of `staybook_core::booking::VALID_BOOKING_STATUSES`.
    pub status: String,
    pub special_requests: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn duration_nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    /// Parse the stored status. The table CHECK constraint keeps this infallible
    /// in practice; a failure means the row was written outside the schema.
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        self.status
            .parse()
            .map_err(|_| CoreError::Internal(format!("Unknown booking status '{}'", self.status)))
    }

    pub fn to_booked_stay(&self) -> Result<BookedStay, CoreError> {
        Ok(BookedStay {
            booking_id: self.id,
            check_in: self.check_in_date,
            check_out: self.check_out_date,
            status: self.status()?,
        })
    }

    pub fn to_reviewed_booking(&self) -> Result<ReviewedBooking, CoreError> {
        Ok(ReviewedBooking {
            listing_id: self.listing_id,
            guest_id: self.guest_id,
            status: self.status()?,
        })
    }
}

/// Request payload for creating a booking. The guest is the caller and the
/// total price is computed server-side.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBooking {
    pub listing_id: EntityId,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub number_of_guests: i64,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

/// Fully resolved booking row to insert.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub listing_id: EntityId,
    pub guest_id: DbId,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub number_of_guests: i64,
    pub total_price_cents: i64,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
}

/// Request payload for editing a booking's stay. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBooking {
    pub check_in_date: Option<Date>,
    pub check_out_date: Option<Date>,
    pub number_of_guests: Option<i64>,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

/// Resolved stay change applied by `BookingRepo::reschedule_if_available`.
#[derive(Debug, Clone)]
pub struct RescheduleBooking {
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub number_of_guests: i64,
    pub total_price_cents: i64,
    pub special_requests: Option<String>,
}

/// Request payload for `PUT /bookings/{id}/status`.
///
/// Kept as a string so an unknown status is reported as a field error rather
/// than a body deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: String,
}
