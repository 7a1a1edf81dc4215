//! Repository for the `reviews` table.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use staybook_core::types::{DbId, EntityId};
use uuid::Uuid;

use crate::models::review::{CreateReview, Review, UpdateReview};

/// Column list for the `reviews` table.
const COLUMNS: &str =
    "id, listing_id, reviewer_id, booking_id, rating, comment, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review written by `reviewer_id`.
    ///
    /// The `uq_reviews_listing_reviewer` constraint rejects a second review of
    /// the same listing by the same reviewer.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateReview,
        reviewer_id: DbId,
    ) -> Result<Review, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO reviews
                (id, listing_id, reviewer_id, booking_id, rating, comment, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(Uuid::new_v4())
            .bind(input.listing_id)
            .bind(reviewer_id)
            .bind(input.booking_id)
            .bind(input.rating)
            .bind(&input.comment)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Find a review by ID.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: EntityId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = ?1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `reviewer_id` has already reviewed `listing_id`.
    pub async fn exists_for(
        pool: &SqlitePool,
        listing_id: EntityId,
        reviewer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE listing_id = ?1 AND reviewer_id = ?2)",
        )
        .bind(listing_id)
        .bind(reviewer_id)
        .fetch_one(pool)
        .await
    }

    /// List reviews newest first, optionally for a single listing.
    pub async fn list(
        pool: &SqlitePool,
        listing_id: Option<EntityId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE (?1 IS NULL OR listing_id = ?1)
             ORDER BY created_at DESC
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(listing_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every (listing, reviewer) pair that already has a review.
    pub async fn reviewed_pairs<'e, E>(executor: E) -> Result<Vec<(EntityId, DbId)>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, (EntityId, DbId)>("SELECT listing_id, reviewer_id FROM reviews")
            .fetch_all(executor)
            .await
    }

    /// Update a review's rating and/or comment.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: EntityId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET
                rating = COALESCE(?2, rating),
                comment = COALESCE(?3, comment),
                updated_at = ?4
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.rating)
            .bind(&input.comment)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a review. Returns `true` if a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(pool)
            .await
    }
}
