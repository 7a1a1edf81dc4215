//! Review rules: rating bounds, one review per (listing, reviewer), and the
//! conditions under which a review may cite a booking.

use crate::booking::BookingStatus;
use crate::error::CoreError;
use crate::types::{DbId, EntityId};

/// Lowest accepted star rating.
pub const MIN_RATING: i64 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: i64 = 5;

/// Validate that a rating is an integer in `[MIN_RATING, MAX_RATING]`.
pub fn validate_rating(rating: i64) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::invalid_field(
            "rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}."),
        ));
    }
    Ok(())
}

/// Validate that a review comment is not blank.
pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.trim().is_empty() {
        return Err(CoreError::invalid_field(
            "comment",
            "This field may not be blank.",
        ));
    }
    Ok(())
}

/// Reject a second review by the same reviewer on the same listing.
///
/// `already_reviewed` is the result of looking up an existing
/// (listing, reviewer) row.
pub fn ensure_first_review(already_reviewed: bool) -> Result<(), CoreError> {
    if already_reviewed {
        return Err(CoreError::invalid_field(
            "listing_id",
            "You have already reviewed this listing.",
        ));
    }
    Ok(())
}

/// The fields of a booking a review may reference.
#[derive(Debug, Clone, Copy)]
pub struct ReviewedBooking {
    pub listing_id: EntityId,
    pub guest_id: DbId,
    pub status: BookingStatus,
}

/// A review citing a booking must come from that booking's guest, target the
/// same listing, and follow a completed stay.
pub fn validate_review_booking(
    booking: &ReviewedBooking,
    listing_id: EntityId,
    reviewer_id: DbId,
) -> Result<(), CoreError> {
    if booking.guest_id != reviewer_id {
        return Err(CoreError::invalid_field(
            "booking_id",
            "You can only review bookings you made.",
        ));
    }
    if booking.listing_id != listing_id {
        return Err(CoreError::invalid_field(
            "booking_id",
            "The booking does not belong to this listing.",
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(CoreError::invalid_field(
            "booking_id",
            "You can only review completed bookings.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_ratings_in_range_accepted() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok(), "rating {rating} should pass");
        }
    }

    #[test]
    fn test_ratings_out_of_range_rejected() {
        for rating in [0, 6, -1, 100] {
            assert_matches!(
                validate_rating(rating),
                Err(CoreError::InvalidField { field: "rating", .. })
            );
        }
    }

    #[test]
    fn test_blank_comment_rejected() {
        assert!(validate_comment("").is_err());
        assert!(validate_comment("  \n").is_err());
        assert!(validate_comment("Lovely stay").is_ok());
    }

    #[test]
    fn test_duplicate_review_rejected() {
        assert!(ensure_first_review(false).is_ok());
        let err = ensure_first_review(true).unwrap_err();
        assert!(err.to_string().contains("already reviewed"));
    }

    #[test]
    fn test_review_booking_rules() {
        let listing_id = Uuid::new_v4();
        let booking = ReviewedBooking {
            listing_id,
            guest_id: 7,
            status: BookingStatus::Completed,
        };
        assert!(validate_review_booking(&booking, listing_id, 7).is_ok());

        // Someone else's booking.
        assert!(validate_review_booking(&booking, listing_id, 8).is_err());

        // Wrong listing.
        assert!(validate_review_booking(&booking, Uuid::new_v4(), 7).is_err());

        // Stay not finished yet.
        let pending = ReviewedBooking {
            status: BookingStatus::Confirmed,
            ..booking
        };
        let err = validate_review_booking(&pending, listing_id, 7).unwrap_err();
        assert!(err.to_string().contains("completed"));
    }
}
