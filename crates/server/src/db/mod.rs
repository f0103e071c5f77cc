//! Database operations for the support store (`SQLite`).
//!
//! ## Tables
//!
//! - `users` - Customer accounts
//! - `product_faqs` - FAQ entries searchable by the agent
//! - `orders` - Customer orders (line items as JSON)
//! - `invoices` - Billing invoices
//! - `conversations` - Chat conversations
//! - `messages` - Chat message history
//!
//! # Migrations
//!
//! Migrations are embedded from the workspace `migrations/` directory and run
//! via:
//! ```bash
//! cargo run -p helpdesk-cli -- migrate
//! ```

pub mod conversations;
pub mod faqs;
pub mod fixtures;
pub mod invoices;
pub mod orders;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use conversations::ConversationRepository;
pub use faqs::FaqRepository;
pub use invoices::InvoiceRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Connection pool type used throughout the server.
pub type DbPool = SqlitePool;

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling and foreign keys
/// are enabled on every connection.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run any pending migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{DbPool, MIGRATOR};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory pool with the schema applied.
    ///
    /// A single connection keeps the in-memory database alive and shared.
    pub async fn memory_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect to in-memory database");

        MIGRATOR.run(&pool).await.expect("run migrations");
        pool
    }
}
