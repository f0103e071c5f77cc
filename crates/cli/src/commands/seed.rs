//! Database seeding command.
//!
//! Loads the demo dataset: one user (Jane Doe), four FAQs, three orders,
//! two invoices, and a sample conversation. Safe to run repeatedly.

use helpdesk_server::db::{self, fixtures};

use super::{CommandError, database_url};

/// Migrate and seed the configured database.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be opened or a write fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url();

    tracing::info!("Connecting to {url}...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Seeding...");
    let report = fixtures::seed(&pool).await?;

    tracing::info!(
        faqs_inserted = report.faqs_inserted,
        orders_upserted = report.orders_upserted,
        invoices_upserted = report.invoices_upserted,
        conversation_created = report.conversation_created,
        "Seed complete"
    );
    Ok(())
}
