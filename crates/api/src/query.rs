//! Query parameter types shared by handler modules.

use serde::Deserialize;
use staybook_core::types::{Date, EntityId};
use staybook_db::models::listing::ListingFilter;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before they reach
/// a repository.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /listings` search parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingSearchParams {
    pub location: Option<String>,
    pub available: Option<bool>,
    pub min_guests: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListingSearchParams {
    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            location: self
                .location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            available: self.available,
            min_guests: self.min_guests,
        }
    }
}

/// `GET /listings/{id}/availability` parameters.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub check_in: Date,
    pub check_out: Date,
}

/// `GET /reviews` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListParams {
    pub listing_id: Option<EntityId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
