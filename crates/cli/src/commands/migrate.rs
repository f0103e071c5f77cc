//! Database migration command.

use helpdesk_server::db;

use super::{CommandError, database_url};

/// Run pending migrations against the configured database.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be opened or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url();

    tracing::info!("Connecting to {url}...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
