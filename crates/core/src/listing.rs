//! Listing field rules.

use crate::error::CoreError;

/// Maximum length of a listing title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a listing location.
pub const MAX_LOCATION_LENGTH: usize = 200;

/// Validate the numeric fields of a listing.
///
/// Each argument is optional so the same rule set serves full creates and
/// partial updates; `None` means "not being changed".
pub fn validate_listing_numbers(
    price_per_night_cents: Option<i64>,
    number_of_bedrooms: Option<i64>,
    number_of_bathrooms: Option<i64>,
    max_guests: Option<i64>,
) -> Result<(), CoreError> {
    if price_per_night_cents.is_some_and(|p| p <= 0) {
        return Err(CoreError::invalid_field(
            "price_per_night_cents",
            "Price per night must be greater than 0.",
        ));
    }
    if number_of_bedrooms.is_some_and(|n| n < 1) {
        return Err(CoreError::invalid_field(
            "number_of_bedrooms",
            "Number of bedrooms must be at least 1.",
        ));
    }
    if number_of_bathrooms.is_some_and(|n| n < 1) {
        return Err(CoreError::invalid_field(
            "number_of_bathrooms",
            "Number of bathrooms must be at least 1.",
        ));
    }
    if max_guests.is_some_and(|n| n < 1) {
        return Err(CoreError::invalid_field(
            "max_guests",
            "Maximum guests must be at least 1.",
        ));
    }
    Ok(())
}

/// Reject blank text fields (whitespace only counts as blank).
pub fn validate_required_text(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid_field(field, "This field may not be blank."));
    }
    Ok(())
}
