//! CLI command implementations.

pub mod migrate;
pub mod seed;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Could not open the database.
    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    /// A migration failed.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Seeding failed.
    #[error("seeding failed: {0}")]
    Seed(#[from] helpdesk_server::db::RepositoryError),
}

/// Database URL from the environment, with the server's default.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:helpdesk.db".to_string())
}
