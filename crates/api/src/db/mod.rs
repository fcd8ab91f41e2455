//! Database access for the catalog `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Registered accounts (unique username, unique email)
//! - `fashion_items` - Catalog items
//!
//! Handlers talk to the [`UserStore`] and [`ItemStore`] traits. The
//! `PostgreSQL` implementations check a connection out of the pool for each
//! operation; the checked-out `PoolConnection` is returned to the pool when it
//! drops, whether the operation succeeded, failed, or the request was aborted.
//!
//! # Schema
//!
//! Migrations live in `crates/api/migrations/` and are embedded in the binary.
//! They run on server startup and via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod items;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use atelier_core::{Email, ItemId, Username};

pub use items::ItemRepository;
pub use users::UserRepository;

use crate::models::item::{Item, ItemFields, ItemPatch};
use crate::models::user::{NewUser, User};

/// Number of attempts made to create the schema before giving up.
pub const SCHEMA_ATTEMPTS: u32 = 5;

/// Fixed delay between schema creation attempts.
pub const SCHEMA_RETRY_DELAY: Duration = Duration::from_secs(2);

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(UniqueField),
}

/// Which unique column an insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username => f.write_str("username already exists"),
            Self::Email => f.write_str("email already exists"),
        }
    }
}

/// Credential store: registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user by exact email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    async fn insert(&self, user: NewUser<'_>) -> Result<User, RepositoryError>;
}

/// Item repository: catalog items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, ordered by id.
    async fn list(&self) -> Result<Vec<Item>, RepositoryError>;

    /// One item by id.
    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Insert an item and return it with its assigned id.
    async fn insert(&self, fields: &ItemFields) -> Result<Item, RepositoryError>;

    /// Overwrite every field of an item. `None` if the id is unknown.
    async fn replace(&self, id: ItemId, fields: &ItemFields)
    -> Result<Option<Item>, RepositoryError>;

    /// Overwrite only the fields present in `patch`. `None` if the id is unknown.
    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, RepositoryError>;

    /// Delete an item. Returns `false` if it did not exist.
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool.
///
/// The pool connects lazily so that startup can retry schema creation while
/// the database is still coming up.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

/// Create the tables, retrying [`SCHEMA_ATTEMPTS`] times with a fixed
/// [`SCHEMA_RETRY_DELAY`] between attempts.
///
/// # Errors
///
/// Returns the last `MigrateError` once every attempt has failed.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), MigrateError> {
    ensure_schema_with(pool, SCHEMA_ATTEMPTS, SCHEMA_RETRY_DELAY).await
}

/// Create the tables with an explicit retry budget.
///
/// # Errors
///
/// Returns the last `MigrateError` once every attempt has failed.
pub async fn ensure_schema_with(
    pool: &PgPool,
    attempts: u32,
    delay: Duration,
) -> Result<(), MigrateError> {
    let mut attempt = 1;
    loop {
        tracing::info!(attempt, attempts, "Creating database tables");
        match MIGRATOR.run(pool).await {
            Ok(()) => {
                tracing::info!("Database tables ready");
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    attempts,
                    retry_in_secs = delay.as_secs(),
                    "Database tables not created, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, attempts, "Giving up on database tables");
                return Err(e);
            }
        }
    }
}

/// Map a unique-violation on insert into the field it collided with.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    let field = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some("users_email_key") => Some(UniqueField::Email),
                Some("users_username_key") => Some(UniqueField::Username),
                _ => None,
            }
        }
        _ => None,
    };
    field.map_or(RepositoryError::Database(err), RepositoryError::Conflict)
}

/// Parse a stored username, reporting invalid rows as corruption.
pub(crate) fn stored_username(raw: &str) -> Result<Username, RepositoryError> {
    Username::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid username in database: {e}")))
}
