//! Repository for the `listings` table.

use chrono::Utc;
use sqlx::{Connection, Executor, Sqlite, SqliteConnection, SqlitePool};
use staybook_core::types::{DbId, EntityId};
use uuid::Uuid;

use crate::models::listing::{
    CreateListing, Listing, ListingFilter, ListingWithRating, UpdateListing,
};

/// Column list for the `listings` table.
const COLUMNS: &str = "id, title, description, location, price_per_night_cents, \
    number_of_bedrooms, number_of_bathrooms, max_guests, host_id, is_available, \
    created_at, updated_at";

/// Same columns qualified with the `l` alias, plus review aggregates.
const RATED_COLUMNS: &str = "l.id, l.title, l.description, l.location, \
    l.price_per_night_cents, l.number_of_bedrooms, l.number_of_bathrooms, l.max_guests, \
    l.host_id, l.is_available, l.created_at, l.updated_at, \
    COALESCE(AVG(r.rating), 0.0) AS average_rating, COUNT(r.id) AS total_reviews";

/// Row counts removed by [`ListingRepo::delete_all_with_dependents`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedRows {
    pub listings: u64,
    pub bookings: u64,
    pub reviews: u64,
}

/// Provides CRUD operations for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Insert a new listing owned by `host_id`.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateListing,
        host_id: DbId,
    ) -> Result<Listing, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO listings
                (id, title, description, location, price_per_night_cents, number_of_bedrooms,
                 number_of_bathrooms, max_guests, host_id, is_available, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, COALESCE(?10, 1), ?11, ?11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.price_per_night_cents)
            .bind(input.number_of_bedrooms)
            .bind(input.number_of_bathrooms)
            .bind(input.max_guests)
            .bind(host_id)
            .bind(input.is_available)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Find a listing by ID.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: EntityId,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = ?1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a listing by ID together with its rating aggregates.
    pub async fn find_with_rating(
        pool: &SqlitePool,
        id: EntityId,
    ) -> Result<Option<ListingWithRating>, sqlx::Error> {
        let query = format!(
            "SELECT {RATED_COLUMNS}
             FROM listings l
             LEFT JOIN reviews r ON r.listing_id = l.id
             WHERE l.id = ?1
             GROUP BY l.id"
        );
        sqlx::query_as::<_, ListingWithRating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List listings newest first, applying the optional filters.
    pub async fn list(
        pool: &SqlitePool,
        filter: &ListingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ListingWithRating>, sqlx::Error> {
        let query = format!(
            "SELECT {RATED_COLUMNS}
             FROM listings l
             LEFT JOIN reviews r ON r.listing_id = l.id
             WHERE (?1 IS NULL OR l.location LIKE '%' || ?1 || '%' ESCAPE '\\')
               AND (?2 IS NULL OR l.is_available = ?2)
               AND (?3 IS NULL OR l.max_guests >= ?3)
             GROUP BY l.id
             ORDER BY l.created_at DESC
             LIMIT ?4 OFFSET ?5"
        );
        sqlx::query_as::<_, ListingWithRating>(&query)
            .bind(filter.location.as_deref().map(escape_like))
            .bind(filter.available)
            .bind(filter.min_guests)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All listings open for booking, oldest first.
    pub async fn list_available(pool: &SqlitePool) -> Result<Vec<Listing>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM listings WHERE is_available = 1 ORDER BY created_at");
        sqlx::query_as::<_, Listing>(&query).fetch_all(pool).await
    }

    /// All listings, oldest first.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Listing>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!("SELECT {COLUMNS} FROM listings ORDER BY created_at");
        sqlx::query_as::<_, Listing>(&query).fetch_all(executor).await
    }

    /// Update a listing. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: EntityId,
        input: &UpdateListing,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                location = COALESCE(?4, location),
                price_per_night_cents = COALESCE(?5, price_per_night_cents),
                number_of_bedrooms = COALESCE(?6, number_of_bedrooms),
                number_of_bathrooms = COALESCE(?7, number_of_bathrooms),
                max_guests = COALESCE(?8, max_guests),
                is_available = COALESCE(?9, is_available),
                updated_at = ?10
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.price_per_night_cents)
            .bind(input.number_of_bedrooms)
            .bind(input.number_of_bathrooms)
            .bind(input.max_guests)
            .bind(input.is_available)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a listing. Its bookings and reviews go with it (FK cascade).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(pool)
            .await
    }

    /// Remove every review, booking and listing in one transaction. Users stay.
    ///
    /// On a connection that is already inside a transaction this runs as a
    /// savepoint, so the outer transaction decides whether the rows go.
    pub async fn delete_all_with_dependents(
        conn: &mut SqliteConnection,
    ) -> Result<ClearedRows, sqlx::Error> {
        let mut tx = conn.begin().await?;

        let reviews = sqlx::query("DELETE FROM reviews")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let bookings = sqlx::query("DELETE FROM bookings")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let listings = sqlx::query("DELETE FROM listings")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(ClearedRows {
            listings,
            bookings,
            reviews,
        })
    }
}

/// Escape LIKE wildcards so user text matches literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
