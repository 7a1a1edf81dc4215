//! The seeding run.
//!
//! Listings, bookings and reviews are drawn from a single RNG in a fixed
//! order, so a run over the same starting data with the same `rng_seed`
//! produces the same counts. Bookings are checked with the core validator
//! against an in-memory view of each listing's occupied dates, then written
//! with the guarded insert the API uses.
//!
//! The whole run happens in one transaction: a run that fails part way
//! leaves the database exactly as it found it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sqlx::{SqliteConnection, SqlitePool};
use staybook_core::booking::{
    total_price_cents, validate_booking, BookedStay, BookingCandidate, BookingRejection,
    BookingStatus,
};
use staybook_core::error::CoreError;
use staybook_core::listing::validate_listing_numbers;
use staybook_core::password::hash_password;
use staybook_core::review::{validate_comment, validate_rating, validate_review_booking};
use staybook_core::types::{DbId, EntityId};
use staybook_db::models::booking::{Booking, NewBooking};
use staybook_db::models::listing::{CreateListing, Listing};
use staybook_db::models::review::CreateReview;
use staybook_db::models::user::{CreateUser, User};
use staybook_db::repositories::{BookingRepo, ClearedRows, ListingRepo, ReviewRepo, UserRepo};

use crate::error::SeedError;
use crate::fixtures::{
    FixtureUser, DESCRIPTIONS, FIXTURE_PASSWORD, GUESTS, HOSTS, LOCATIONS, RATING_WEIGHTS,
    REVIEW_COMMENTS, SPECIAL_REQUESTS, STATUS_WEIGHTS, TITLES,
};

/// Fresh candidates tried per requested booking before it is skipped.
pub const MAX_BOOKING_ATTEMPTS: usize = 10;

/// How far before today a seeded stay may start.
const BOOKING_WINDOW_PAST_DAYS: i64 = 90;
/// How far after today a seeded stay may start.
const BOOKING_WINDOW_FUTURE_DAYS: i64 = 365;
const MAX_SEEDED_NIGHTS: i64 = 14;
const MAX_SEEDED_PARTY: i64 = 6;

/// What a run should create.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub listings: usize,
    pub bookings: usize,
    pub reviews: usize,
    /// Delete existing listings, bookings and reviews first.
    pub clear: bool,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            listings: 20,
            bookings: 50,
            reviews: 30,
            clear: false,
            rng_seed: None,
        }
    }
}

/// Counts from a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows removed by `clear`, when requested.
    pub cleared: Option<ClearedRows>,
    pub users_created: usize,
    pub listings_created: usize,
    pub bookings_created: usize,
    pub bookings_skipped: usize,
    pub reviews_created: usize,
    pub reviews_skipped: usize,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cleared) = self.cleared {
            writeln!(
                f,
                "Cleared {} listings, {} bookings, {} reviews",
                cleared.listings, cleared.bookings, cleared.reviews
            )?;
        }
        write!(
            f,
            "Created {} users, {} listings, {} bookings ({} skipped), {} reviews ({} skipped)",
            self.users_created,
            self.listings_created,
            self.bookings_created,
            self.bookings_skipped,
            self.reviews_created,
            self.reviews_skipped,
        )
    }
}

/// Populate `pool` according to `options`. The schema must already be migrated.
///
/// Nothing is committed unless every step succeeds.
pub async fn run(pool: &SqlitePool, options: &SeedOptions) -> Result<SeedReport, SeedError> {
    let mut tx = pool.begin().await?;
    let mut rng = match options.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut report = SeedReport::default();

    if options.clear {
        let cleared = ListingRepo::delete_all_with_dependents(&mut tx).await?;
        tracing::info!(
            listings = cleared.listings,
            bookings = cleared.bookings,
            reviews = cleared.reviews,
            "Cleared existing data",
        );
        report.cleared = Some(cleared);
    }

    let (hosts, created_hosts) = ensure_users(&mut tx, HOSTS).await?;
    let (guests, created_guests) = ensure_users(&mut tx, GUESTS).await?;
    report.users_created = created_hosts + created_guests;

    let mut listings = ListingRepo::list_all(&mut *tx).await?;
    for _ in 0..options.listings {
        listings.push(create_listing(&mut tx, &mut rng, &hosts).await?);
        report.listings_created += 1;
    }
    tracing::info!(count = report.listings_created, "Seeded listings");

    let mut completed = BookingRepo::list_by_status(&mut *tx, BookingStatus::Completed).await?;
    if options.bookings > 0 {
        let mut seeder = BookingSeeder::load(&mut tx, &listings).await?;
        let today = Utc::now().date_naive();
        for _ in 0..options.bookings {
            match seeder.seed_one(&mut tx, &mut rng, &guests, today).await? {
                Some(booking) => {
                    if booking.status()? == BookingStatus::Completed {
                        completed.push(booking);
                    }
                    report.bookings_created += 1;
                }
                None => report.bookings_skipped += 1,
            }
        }
    }
    tracing::info!(
        created = report.bookings_created,
        skipped = report.bookings_skipped,
        "Seeded bookings",
    );

    if options.reviews > 0 {
        let mut reviewed: HashSet<(EntityId, DbId)> =
            ReviewRepo::reviewed_pairs(&mut *tx).await?.into_iter().collect();
        for _ in 0..options.reviews {
            let created =
                seed_one_review(&mut tx, &mut rng, &listings, &guests, &completed, &mut reviewed)
                    .await?;
            if created {
                report.reviews_created += 1;
            } else {
                report.reviews_skipped += 1;
            }
        }
    }
    tracing::info!(
        created = report.reviews_created,
        skipped = report.reviews_skipped,
        "Seeded reviews",
    );

    tx.commit().await?;
    tracing::info!(
        users = report.users_created,
        listings = report.listings_created,
        bookings = report.bookings_created,
        reviews = report.reviews_created,
        "Seeding complete",
    );
    Ok(report)
}

/// Load or create each fixture user, returning them in fixture order and the
/// number newly created.
async fn ensure_users(
    conn: &mut SqliteConnection,
    fixtures: &[FixtureUser],
) -> Result<(Vec<User>, usize), SeedError> {
    let mut users = Vec::with_capacity(fixtures.len());
    let mut created = 0;

    for &(username, first_name, last_name) in fixtures {
        if let Some(user) = UserRepo::find_by_username(&mut *conn, username).await? {
            users.push(user);
            continue;
        }

        let password_hash =
            hash_password(FIXTURE_PASSWORD).map_err(|e| SeedError::Password(e.to_string()))?;
        let input = CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash,
        };
        let user = UserRepo::create(&mut *conn, &input).await?;
        tracing::debug!(user_id = user.id, username, "Created user");
        users.push(user);
        created += 1;
    }

    Ok((users, created))
}

async fn create_listing(
    conn: &mut SqliteConnection,
    rng: &mut StdRng,
    hosts: &[User],
) -> Result<Listing, SeedError> {
    let host = hosts.choose(rng).ok_or(SeedError::NoHosts)?;

    let input = CreateListing {
        title: TITLES.choose(rng).copied().unwrap_or_default().to_string(),
        description: DESCRIPTIONS.choose(rng).copied().unwrap_or_default().to_string(),
        location: LOCATIONS.choose(rng).copied().unwrap_or_default().to_string(),
        price_per_night_cents: rng.random_range(50..=500) * 100,
        number_of_bedrooms: rng.random_range(1..=4),
        number_of_bathrooms: rng.random_range(1..=3),
        max_guests: rng.random_range(2..=8),
        is_available: Some(rng.random_ratio(3, 4)),
    };
    validate_listing_numbers(
        Some(input.price_per_night_cents),
        Some(input.number_of_bedrooms),
        Some(input.number_of_bathrooms),
        Some(input.max_guests),
    )?;

    let listing = ListingRepo::create(conn, &input, host.id).await?;
    tracing::debug!(listing_id = %listing.id, host_id = host.id, "Created listing");
    Ok(listing)
}

/// Bookable listings plus the dates each one already holds.
struct BookingSeeder {
    available: Vec<Listing>,
    occupied: HashMap<EntityId, Vec<BookedStay>>,
}

impl BookingSeeder {
    async fn load(conn: &mut SqliteConnection, listings: &[Listing]) -> Result<Self, SeedError> {
        let available: Vec<Listing> =
            listings.iter().filter(|l| l.is_available).cloned().collect();

        let mut occupied = HashMap::with_capacity(available.len());
        for listing in &available {
            let stays = BookingRepo::list_occupying(&mut *conn, listing.id)
                .await?
                .iter()
                .map(Booking::to_booked_stay)
                .collect::<Result<Vec<_>, CoreError>>()?;
            occupied.insert(listing.id, stays);
        }

        Ok(Self {
            available,
            occupied,
        })
    }

    /// Try up to [`MAX_BOOKING_ATTEMPTS`] random candidates. `None` means every
    /// attempt collided with held dates.
    async fn seed_one(
        &mut self,
        conn: &mut SqliteConnection,
        rng: &mut StdRng,
        guests: &[User],
        today: NaiveDate,
    ) -> Result<Option<Booking>, SeedError> {
        if self.available.is_empty() || guests.is_empty() {
            tracing::warn!("No available listings or guests; skipping booking");
            return Ok(None);
        }

        for attempt in 1..=MAX_BOOKING_ATTEMPTS {
            let Some(listing) = self.available.choose(rng) else {
                break;
            };
            let Some(guest) = guests.choose(rng) else {
                break;
            };

            let offset = rng.random_range(-BOOKING_WINDOW_PAST_DAYS..=BOOKING_WINDOW_FUTURE_DAYS);
            let nights = rng.random_range(1..=MAX_SEEDED_NIGHTS);
            let check_in = today + Duration::days(offset);
            let candidate = BookingCandidate {
                check_in,
                check_out: check_in + Duration::days(nights),
                number_of_guests: rng
                    .random_range(1..=listing.max_guests.clamp(1, MAX_SEEDED_PARTY)),
                exclude: None,
                earliest_check_in: None,
            };
            let status = STATUS_WEIGHTS
                .choose_weighted(rng, |&(_, weight)| weight)
                .map_err(|e| SeedError::Weights(e.to_string()))?
                .0;
            let special_requests = SPECIAL_REQUESTS
                .choose(rng)
                .copied()
                .flatten()
                .map(str::to_string);

            let existing = self.occupied.get(&listing.id).map_or(&[][..], Vec::as_slice);
            let interval = match validate_booking(&candidate, listing.capacity(), existing) {
                Ok(interval) => interval,
                Err(BookingRejection::DatesUnavailable) => {
                    tracing::debug!(
                        listing_id = %listing.id,
                        attempt,
                        "Seeded dates collide; retrying",
                    );
                    continue;
                }
                Err(other) => return Err(CoreError::from(other).into()),
            };

            let new_booking = NewBooking {
                listing_id: listing.id,
                guest_id: guest.id,
                check_in_date: interval.check_in(),
                check_out_date: interval.check_out(),
                number_of_guests: candidate.number_of_guests,
                total_price_cents: total_price_cents(listing.price_per_night_cents, &interval)?,
                status,
                special_requests,
            };

            let Some(booking) =
                BookingRepo::create_if_available(&mut *conn, &new_booking).await?
            else {
                tracing::debug!(
                    listing_id = %listing.id,
                    attempt,
                    "Guarded insert rejected dates; retrying",
                );
                continue;
            };

            self.occupied
                .entry(booking.listing_id)
                .or_default()
                .push(booking.to_booked_stay()?);
            return Ok(Some(booking));
        }

        tracing::warn!(
            attempts = MAX_BOOKING_ATTEMPTS,
            "Could not find free dates; skipping booking",
        );
        Ok(None)
    }
}

/// Create one review. Returns `false` when the drawn (listing, reviewer) pair
/// is already reviewed or there is nothing to review.
async fn seed_one_review(
    conn: &mut SqliteConnection,
    rng: &mut StdRng,
    listings: &[Listing],
    guests: &[User],
    completed: &[Booking],
    reviewed: &mut HashSet<(EntityId, DbId)>,
) -> Result<bool, SeedError> {
    let (listing_id, reviewer_id, booking_id) = if completed.is_empty() {
        let (Some(listing), Some(guest)) = (listings.choose(rng), guests.choose(rng)) else {
            tracing::warn!("No listings or guests to review; skipping review");
            return Ok(false);
        };
        (listing.id, guest.id, None)
    } else {
        let Some(booking) = completed.choose(rng) else {
            return Ok(false);
        };
        validate_review_booking(
            &booking.to_reviewed_booking()?,
            booking.listing_id,
            booking.guest_id,
        )?;
        (booking.listing_id, booking.guest_id, Some(booking.id))
    };

    let rating = RATING_WEIGHTS
        .choose_weighted(rng, |&(_, weight)| weight)
        .map_err(|e| SeedError::Weights(e.to_string()))?
        .0;
    let comment = REVIEW_COMMENTS.choose(rng).copied().unwrap_or_default();

    if !reviewed.insert((listing_id, reviewer_id)) {
        tracing::debug!(%listing_id, reviewer_id, "Pair already reviewed; skipping");
        return Ok(false);
    }

    validate_rating(rating)?;
    validate_comment(comment)?;

    let input = CreateReview {
        listing_id,
        booking_id,
        rating,
        comment: comment.to_string(),
    };
    let review = ReviewRepo::create(conn, &input, reviewer_id).await?;
    tracing::debug!(review_id = %review.id, %listing_id, reviewer_id, rating, "Created review");
    Ok(true)
}
