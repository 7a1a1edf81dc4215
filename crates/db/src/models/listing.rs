//! Listing models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staybook_core::booking::ListingCapacity;
use staybook_core::types::{DbId, EntityId, Timestamp};
use validator::Validate;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_per_night_cents: i64,
    pub number_of_bedrooms: i64,
    pub number_of_bathrooms: i64,
    pub max_guests: i64,
    pub host_id: DbId,
    pub is_available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    pub fn capacity(&self) -> ListingCapacity {
        ListingCapacity {
            max_guests: self.max_guests,
            is_available: self.is_available,
        }
    }
}

/// A listing joined with its review aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListingWithRating {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub listing: Listing,
    /// Mean review rating, `0.0` when the listing has no reviews.
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// DTO for creating a listing. The host is the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListing {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub price_per_night_cents: i64,
    pub number_of_bedrooms: i64,
    pub number_of_bathrooms: i64,
    pub max_guests: i64,
    pub is_available: Option<bool>,
}

/// DTO for partially updating a listing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateListing {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub price_per_night_cents: Option<i64>,
    pub number_of_bedrooms: Option<i64>,
    pub number_of_bathrooms: Option<i64>,
    pub max_guests: Option<i64>,
    pub is_available: Option<bool>,
}

/// Optional filters for listing search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring match on `location`.
    pub location: Option<String>,
    pub available: Option<bool>,
    /// Only listings that fit at least this many guests.
    pub min_guests: Option<i64>,
}
