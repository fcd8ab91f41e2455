//! Table creation command.
//!
//! # Environment Variables
//!
//! - `ATELIER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations are embedded from `crates/api/migrations/` and are the same ones
//! the server applies on startup.

use atelier_api::config::{ConfigError, database_url_from_env};
use atelier_api::db;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Create the tables, retrying up to `attempts` times.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing or every attempt fails.
pub async fn run(attempts: u32) -> Result<(), MigrationError> {
    let database_url = database_url_from_env()?;
    let pool = db::create_pool(&database_url)?;

    tracing::info!("Creating database tables...");
    db::ensure_schema_with(&pool, attempts.max(1), db::SCHEMA_RETRY_DELAY).await?;

    tracing::info!("Database tables ready");
    pool.close().await;
    Ok(())
}
