use staybook_core::error::CoreError;

/// Failures that abort a seeding run.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error("No host users available to own listings")]
    NoHosts,

    #[error("Invalid weight table: {0}")]
    Weights(String),
}
