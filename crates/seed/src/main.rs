//! `seed` populates a Staybook database with development data.
//!
//! ```text
//! seed [--listings N] [--bookings N] [--reviews N] [--clear] [--rng-seed S]
//! ```

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staybook_seed::{run, SeedOptions};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed the database with sample listings, bookings and reviews")]
struct Cli {
    /// Number of listings to create.
    #[arg(long, default_value_t = 20)]
    listings: usize,

    /// Number of bookings to create.
    #[arg(long, default_value_t = 50)]
    bookings: usize,

    /// Number of reviews to create.
    #[arg(long, default_value_t = 30)]
    reviews: usize,

    /// Delete existing listings, bookings and reviews before seeding.
    #[arg(long)]
    clear: bool,

    /// Seed the random generator for a reproducible run.
    #[arg(long)]
    rng_seed: Option<u64>,

    /// SQLite database URL.
    #[arg(long, env = "DATABASE_URL", default_value = staybook_db::DEFAULT_DATABASE_URL)]
    database_url: String,
}

impl Cli {
    fn options(&self) -> SeedOptions {
        SeedOptions {
            listings: self.listings,
            bookings: self.bookings,
            reviews: self.reviews,
            clear: self.clear,
            rng_seed: self.rng_seed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staybook_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = staybook_db::create_pool(&cli.database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", cli.database_url))?;
    staybook_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let report = run(&pool, &cli.options()).await.context("Seeding failed")?;
    pool.close().await;

    println!("{report}");
    Ok(())
}
