//! Repository for the `bookings` table.
//!
//! Writes that place a stay on the calendar (`create_if_available`,
//! `reschedule_if_available`) carry the overlap guard inside the same SQL
//! statement. SQLite runs each statement under its writer lock, so the check
//! and the write cannot be interleaved with a competing request.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use staybook_core::booking::BookingStatus;
use staybook_core::types::{DbId, EntityId};
use uuid::Uuid;

use crate::models::booking::{Booking, NewBooking, RescheduleBooking};

/// Column list for the `bookings` table.
const COLUMNS: &str = "id, listing_id, guest_id, check_in_date, check_out_date, \
    number_of_guests, total_price_cents, status, special_requests, created_at, updated_at";

/// Provides CRUD operations for bookings.
pub struct BookingRepo;

impl BookingRepo {
    /// Insert a booking unless a non-cancelled booking on the same listing
    /// overlaps `[check_in_date, check_out_date)`.
    ///
    /// Returns `None` when the dates are taken. A booking inserted directly as
    /// `cancelled` never conflicts.
    pub async fn create_if_available<'e, E>(
        executor: E,
        input: &NewBooking,
    ) -> Result<Option<Booking>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO bookings
                (id, listing_id, guest_id, check_in_date, check_out_date, number_of_guests,
                 total_price_cents, status, special_requests, created_at, updated_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10
             WHERE ?8 = 'cancelled' OR NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.listing_id = ?2
                  AND b.status <> 'cancelled'
                  AND b.check_in_date < ?5
                  AND b.check_out_date > ?4
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(Uuid::new_v4())
            .bind(input.listing_id)
            .bind(input.guest_id)
            .bind(input.check_in_date)
            .bind(input.check_out_date)
            .bind(input.number_of_guests)
            .bind(input.total_price_cents)
            .bind(input.status.as_str())
            .bind(&input.special_requests)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Find a booking by ID.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: EntityId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = ?1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a guest's bookings, most recently created first.
    pub async fn list_for_guest(
        pool: &SqlitePool,
        guest_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings
             WHERE guest_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(guest_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Bookings that currently hold dates on a listing, ordered by check-in.
    pub async fn list_occupying<'e, E>(
        executor: E,
        listing_id: EntityId,
    ) -> Result<Vec<Booking>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings
             WHERE listing_id = ?1 AND status <> 'cancelled'
             ORDER BY check_in_date"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(listing_id)
            .fetch_all(executor)
            .await
    }

    /// All bookings with the given status, oldest first.
    pub async fn list_by_status<'e, E>(
        executor: E,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings WHERE status = ?1 ORDER BY created_at"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(status.as_str())
            .fetch_all(executor)
            .await
    }

    /// Move a booking to new dates unless another non-cancelled booking on
    /// the same listing overlaps them. The booking never conflicts with itself.
    ///
    /// Returns `None` when the row is missing or the dates are taken; callers
    /// load the row first to tell the two apart.
    pub async fn reschedule_if_available(
        pool: &SqlitePool,
        id: EntityId,
        input: &RescheduleBooking,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET
                check_in_date = ?2,
                check_out_date = ?3,
                number_of_guests = ?4,
                total_price_cents = ?5,
                special_requests = ?6,
                updated_at = ?7
             WHERE id = ?1
               AND NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.listing_id = bookings.listing_id
                  AND b.id <> ?1
                  AND b.status <> 'cancelled'
                  AND b.check_in_date < ?3
                  AND b.check_out_date > ?2
               )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(input.check_in_date)
            .bind(input.check_out_date)
            .bind(input.number_of_guests)
            .bind(input.total_price_cents)
            .bind(&input.special_requests)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set the status: only applies while the row is still in
    /// `from`. Returns `None` if the row is missing or moved concurrently.
    pub async fn transition_status(
        pool: &SqlitePool,
        id: EntityId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET status = ?3, updated_at = ?4
             WHERE id = ?1 AND status = ?2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a booking. Returns `true` if a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(pool)
            .await
    }
}
