//! Review models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staybook_core::types::{DbId, EntityId, Timestamp};

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: EntityId,
    pub listing_id: EntityId,
    pub reviewer_id: DbId,
    pub booking_id: Option<EntityId>,
    pub rating: i64,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a review. The reviewer is the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub listing_id: EntityId,
    pub booking_id: Option<EntityId>,
    pub rating: i64,
    pub comment: String,
}

/// DTO for editing a review's content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}
