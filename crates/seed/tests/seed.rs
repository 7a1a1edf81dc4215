//! Integration tests for the seeding run.

use std::collections::{HashMap, HashSet};

use assert_matches::assert_matches;
use sqlx::SqlitePool;
use staybook_core::booking::{dates_overlap, BookingStatus};
use staybook_db::repositories::{BookingRepo, ListingRepo, ReviewRepo, UserRepo};
use staybook_seed::{run, SeedError, SeedOptions, SeedReport};

fn options(listings: usize, bookings: usize, reviews: usize) -> SeedOptions {
    SeedOptions {
        listings,
        bookings,
        reviews,
        clear: false,
        rng_seed: Some(7),
    }
}

/// Every booking in the database, grouped by listing.
async fn bookings_by_listing(
    pool: &SqlitePool,
) -> HashMap<uuid::Uuid, Vec<staybook_db::models::booking::Booking>> {
    let mut grouped: HashMap<_, Vec<_>> = HashMap::new();
    for status in [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ] {
        for booking in BookingRepo::list_by_status(pool, status).await.unwrap() {
            grouped.entry(booking.listing_id).or_default().push(booking);
        }
    }
    grouped
}

async fn assert_no_overlaps(pool: &SqlitePool) {
    for (listing_id, bookings) in bookings_by_listing(pool).await {
        let held: Vec<_> = bookings.iter().filter(|b| b.status != "cancelled").collect();
        for (i, a) in held.iter().enumerate() {
            assert!(a.check_out_date > a.check_in_date);
            for b in &held[i + 1..] {
                assert!(
                    !dates_overlap(
                        a.check_in_date,
                        a.check_out_date,
                        b.check_in_date,
                        b.check_out_date
                    ),
                    "bookings {} and {} overlap on listing {listing_id}",
                    a.id,
                    b.id,
                );
            }
        }
    }
}

async fn assert_unique_reviews(pool: &SqlitePool) {
    let pairs = ReviewRepo::reviewed_pairs(pool).await.unwrap();
    let unique: HashSet<_> = pairs.iter().copied().collect();
    assert_eq!(pairs.len(), unique.len());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listings_only_run_creates_exactly_that(pool: SqlitePool) {
    let report = run(&pool, &options(10, 0, 0)).await.unwrap();

    assert_eq!(report.listings_created, 10);
    assert_eq!(report.bookings_created, 0);
    assert_eq!(report.reviews_created, 0);
    assert_eq!(ListingRepo::count(&pool).await.unwrap(), 10);
    assert_eq!(BookingRepo::count(&pool).await.unwrap(), 0);
    assert_eq!(ReviewRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fixture_users_are_created_once(pool: SqlitePool) {
    let first = run(&pool, &options(2, 0, 0)).await.unwrap();
    let second = run(&pool, &options(2, 0, 0)).await.unwrap();

    assert_eq!(first.users_created, 8);
    assert_eq!(second.users_created, 0);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 8);

    let host = UserRepo::find_by_username(&pool, "host1").await.unwrap().unwrap();
    assert_eq!(host.email, "host1@example.com");
    assert_eq!(host.first_name, "Jeffrey");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn seeded_listings_respect_field_ranges(pool: SqlitePool) {
    run(&pool, &options(25, 0, 0)).await.unwrap();

    let hosts: HashSet<_> = UserRepo::list_by_username_prefix(&pool, "host")
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();

    for listing in ListingRepo::list_all(&pool).await.unwrap() {
        assert!((5_000..=50_000).contains(&listing.price_per_night_cents));
        assert_eq!(listing.price_per_night_cents % 100, 0);
        assert!((1..=4).contains(&listing.number_of_bedrooms));
        assert!((1..=3).contains(&listing.number_of_bathrooms));
        assert!((2..=8).contains(&listing.max_guests));
        assert!(hosts.contains(&listing.host_id));
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn default_run_keeps_invariants(pool: SqlitePool) {
    let defaults = SeedOptions {
        rng_seed: Some(11),
        ..SeedOptions::default()
    };
    let report = run(&pool, &defaults).await.unwrap();

    assert_eq!(report.listings_created, 20);
    assert_eq!(report.bookings_created + report.bookings_skipped, 50);
    assert_eq!(report.reviews_created + report.reviews_skipped, 30);
    assert_eq!(
        BookingRepo::count(&pool).await.unwrap(),
        report.bookings_created as i64
    );
    assert_eq!(
        ReviewRepo::count(&pool).await.unwrap(),
        report.reviews_created as i64
    );

    assert_no_overlaps(&pool).await;
    assert_unique_reviews(&pool).await;

    let guests: HashSet<_> = UserRepo::list_by_username_prefix(&pool, "guest")
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    for bookings in bookings_by_listing(&pool).await.values() {
        for booking in bookings {
            let listing = ListingRepo::find_by_id(&pool, booking.listing_id)
                .await
                .unwrap()
                .unwrap();
            assert!(listing.is_available);
            assert!(guests.contains(&booking.guest_id));
            assert!((1..=14).contains(&booking.duration_nights()));
            assert!(booking.number_of_guests >= 1);
            assert!(booking.number_of_guests <= listing.max_guests.min(6));
            assert_eq!(
                booking.total_price_cents,
                listing.price_per_night_cents * booking.duration_nights()
            );
        }
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reviews_from_completed_bookings_cite_them(pool: SqlitePool) {
    run(&pool, &options(5, 60, 20)).await.unwrap();

    let completed = BookingRepo::list_by_status(&pool, BookingStatus::Completed)
        .await
        .unwrap();
    if completed.is_empty() {
        return;
    }

    for review in ReviewRepo::list(&pool, None, 100, 0).await.unwrap() {
        assert!((1..=5).contains(&review.rating));
        let booking_id = review.booking_id.expect("review should cite a booking");
        let booking = BookingRepo::find_by_id(&pool, booking_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.status, "completed");
        assert_eq!(booking.listing_id, review.listing_id);
        assert_eq!(booking.guest_id, review.reviewer_id);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reviews_without_bookings_use_random_pairs(pool: SqlitePool) {
    let report = run(&pool, &options(3, 0, 15)).await.unwrap();

    // 3 listings x 4 guests leaves at most 12 distinct pairs.
    assert!(report.reviews_created <= 12);
    assert_eq!(report.reviews_created + report.reviews_skipped, 15);
    assert_unique_reviews(&pool).await;
    for review in ReviewRepo::list(&pool, None, 100, 0).await.unwrap() {
        assert_eq!(review.booking_id, None);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reviews_without_listings_are_skipped(pool: SqlitePool) {
    let report = run(&pool, &options(0, 5, 5)).await.unwrap();

    assert_eq!(report.bookings_created, 0);
    assert_eq!(report.bookings_skipped, 5);
    assert_eq!(report.reviews_created, 0);
    assert_eq!(report.reviews_skipped, 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clear_then_reseed_matches_fresh_seed(pool: SqlitePool) {
    let fresh = SeedOptions {
        clear: true,
        ..options(8, 30, 12)
    };

    let first = run(&pool, &fresh).await.unwrap();
    assert_eq!(first.cleared, Some(Default::default()));

    let second = run(&pool, &fresh).await.unwrap();
    let cleared = second.cleared.unwrap();
    assert_eq!(cleared.listings, 8);
    assert_eq!(cleared.bookings, first.bookings_created as u64);
    assert_eq!(cleared.reviews, first.reviews_created as u64);

    let counts = |r: &SeedReport| {
        (
            r.listings_created,
            r.bookings_created,
            r.bookings_skipped,
            r.reviews_created,
            r.reviews_skipped,
        )
    };
    assert_eq!(counts(&first), counts(&second));
    assert_eq!(ListingRepo::count(&pool).await.unwrap(), 8);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 8);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reseeding_without_clear_adds_valid_rows(pool: SqlitePool) {
    run(&pool, &options(4, 40, 10)).await.unwrap();
    let again = run(
        &pool,
        &SeedOptions {
            rng_seed: Some(8),
            ..options(2, 40, 10)
        },
    )
    .await
    .unwrap();

    assert_eq!(again.cleared, None);
    assert_eq!(ListingRepo::count(&pool).await.unwrap(), 6);
    assert_no_overlaps(&pool).await;
    assert_unique_reviews(&pool).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn saturated_listing_skips_instead_of_overlapping(pool: SqlitePool) {
    let report = run(&pool, &options(1, 200, 0)).await.unwrap();

    assert_eq!(report.bookings_created + report.bookings_skipped, 200);
    assert_no_overlaps(&pool).await;
    assert_matches!(ListingRepo::count(&pool).await, Ok(1));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_run_leaves_existing_data_untouched(pool: SqlitePool) {
    run(&pool, &options(3, 20, 0)).await.unwrap();
    let listings_before: HashSet<_> = ListingRepo::list_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    let bookings_before = BookingRepo::count(&pool).await.unwrap();

    sqlx::query(
        "CREATE TRIGGER reject_reviews BEFORE INSERT ON reviews
         BEGIN SELECT RAISE(ABORT, 'reviews are read-only'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    // Clears, reseeds listings and bookings, then fails on the first review.
    let failing = SeedOptions {
        clear: true,
        ..options(2, 10, 5)
    };
    assert_matches!(run(&pool, &failing).await, Err(SeedError::Database(_)));

    let listings_after: HashSet<_> = ListingRepo::list_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(listings_after, listings_before);
    assert_eq!(BookingRepo::count(&pool).await.unwrap(), bookings_before);
    assert_eq!(ReviewRepo::count(&pool).await.unwrap(), 0);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 8);
}
