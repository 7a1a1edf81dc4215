//! SQLite persistence for Staybook.
//!
//! Row models live in [`models`], query code in [`repositories`]. Schema
//! changes are embedded migrations applied by [`run_migrations`].

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// Default database for local runs, created in the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://staybook.db?mode=rwc";

/// Create a connection pool from a `sqlite:` database URL.
///
/// Foreign keys are enforced on every connection so the cascade rules in the
/// schema apply, and the database file is created when missing.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Cheap round-trip used by startup checks and `GET /health`.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
