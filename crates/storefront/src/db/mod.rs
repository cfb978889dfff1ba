//! Database operations for the marketplace `SQLite` file.
//!
//! # Tables
//!
//! - `users` - Accounts with Argon2 password hashes
//! - `stores` - Sellers, keyed for routing by their unique name
//! - `items` - Products belonging to one store
//! - `orders` - Purchases placed by users
//! - `clicks` - Item view events
//! - `searches` / `searches_items` - Logged search queries
//! - `images` - Item image payloads
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! binary. They run on server startup and via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod engagement;
pub mod images;
pub mod items;
pub mod orders;
pub mod stores;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the embedded migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation: a referenced row does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),
}

impl RepositoryError {
    /// Classify a write error, turning constraint violations into domain errors.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("{what} already exists"));
            }
            if db_err.is_foreign_key_violation() {
                return Self::MissingReference(format!("{what} references a missing row"));
            }
        }
        Self::Database(err)
    }
}

/// Create a `SQLite` connection pool for a database file.
///
/// The file is created if missing. Connections use WAL journaling, enforce
/// foreign keys and wait up to five seconds on a locked database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the file cannot be opened.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a private in-memory database with the schema applied.
///
/// The pool holds a single connection that is never recycled, because each
/// `SQLite` memory connection is its own database.
///
/// # Errors
///
/// Returns `RepositoryError` if the connection or migrations fail.
pub async fn create_memory_pool() -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Apply the embedded migrations. Already-applied migrations are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), RepositoryError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by repository and service tests.

    use bazaar_core::{Price, StoreId, UserId};
    use sqlx::SqlitePool;

    use super::items::{ItemRepository, NewItem};
    use super::stores::{NewStore, StoreRepository};
    use super::users::UserRepository;
    use crate::models::{Item, Store};

    pub async fn pool() -> SqlitePool {
        super::create_memory_pool()
            .await
            .expect("in-memory database should open")
    }

    pub async fn user(pool: &SqlitePool, username: &str) -> UserId {
        let email = bazaar_core::Email::parse(&format!("{username}@example.com"))
            .expect("fixture email is valid");
        let username = bazaar_core::Username::parse(username).expect("fixture username is valid");
        UserRepository::new(pool)
            .create(&username, "$argon2id$fixture", &email, None)
            .await
            .expect("fixture user should insert")
            .id
    }

    pub async fn store(pool: &SqlitePool, owner: UserId, name: &str) -> Store {
        StoreRepository::new(pool)
            .create(
                owner,
                &NewStore {
                    name: name.to_owned(),
                    address: "1 Market St".to_owned(),
                    category: "general".to_owned(),
                    image: None,
                },
            )
            .await
            .expect("fixture store should insert")
    }

    pub async fn item(pool: &SqlitePool, store_id: StoreId, name: &str, price: i64) -> Item {
        ItemRepository::new(pool)
            .create(
                store_id,
                &NewItem {
                    name: name.to_owned(),
                    price: Price::new(price).expect("fixture price is non-negative"),
                    discount: 0,
                    description: format!("{name} description"),
                    category: None,
                    image: None,
                },
            )
            .await
            .expect("fixture item should insert")
    }
}
