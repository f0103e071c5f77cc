//! Deterministic seed data for local development and tests.
//!
//! Seeding is idempotent: orders and invoices upsert on their business keys,
//! FAQ entries skip duplicates, and the sample conversation is only created
//! when the user has none.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use helpdesk_core::{ChatRole, InvoiceStatus, OrderStatus};

use super::{
    ConversationRepository, DbPool, FaqRepository, InvoiceRepository, OrderRepository,
    RepositoryError, UserRepository,
};

/// Counts of rows touched by a seed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedReport {
    /// FAQ entries inserted (existing ones are skipped).
    pub faqs_inserted: usize,
    /// Orders inserted or refreshed.
    pub orders_upserted: usize,
    /// Invoices inserted or refreshed.
    pub invoices_upserted: usize,
    /// Whether the sample conversation was created.
    pub conversation_created: bool,
}

const FAQS: &[(&str, &str, &str)] = &[
    (
        "How do I reset my password?",
        "Go to Settings > Security and click 'Reset Password'.",
        "Account",
    ),
    (
        "What is your return policy?",
        "You can return items within 30 days in original condition. Start a return from your Orders page.",
        "Returns",
    ),
    (
        "Where can I see my invoices?",
        "Open Billing in your dashboard to view all invoices.",
        "Billing",
    ),
    (
        "What is the delivery timeline for standard shipping?",
        "Standard shipping typically takes 3-5 business days.",
        "Shipping",
    ),
];

const SAMPLE_CONVERSATION: &[(ChatRole, &str)] = &[
    (
        ChatRole::System,
        "You are the AI support assistant. Be concise and helpful.",
    ),
    (
        ChatRole::User,
        "Where can I find my invoice for the last order?",
    ),
    (
        ChatRole::Assistant,
        "You can find invoices under Billing in your dashboard. I can also email it to you if you'd like.",
    ),
    (ChatRole::User, "Please email it to me."),
];

fn date(rfc3339: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid seed date {rfc3339}: {e}")))
}

/// Load the seed dataset into the database.
///
/// # Errors
///
/// Returns `RepositoryError` if any write fails.
pub async fn seed(pool: &DbPool) -> Result<SeedReport, RepositoryError> {
    let mut report = SeedReport::default();

    let user = UserRepository::new(pool)
        .upsert("jane.doe@example.com", "Jane Doe")
        .await?;

    let faqs = FaqRepository::new(pool);
    for &(question, answer, category) in FAQS {
        if faqs
            .insert_if_missing(question, answer, Some(category))
            .await?
        {
            report.faqs_inserted += 1;
        }
    }

    let orders = OrderRepository::new(pool);
    orders
        .upsert(
            user.id,
            "ORD-1001",
            OrderStatus::Delivered,
            Some(date("2026-01-15T00:00:00Z")?),
            &json!([
                { "sku": "SKU-MOUSE-1", "name": "Wireless Mouse", "qty": 1, "price": 29.99 },
                { "sku": "SKU-PAD-1", "name": "Mouse Pad", "qty": 1, "price": 9.99 }
            ]),
        )
        .await?;
    orders
        .upsert(
            user.id,
            "ORD-1002",
            OrderStatus::Shipped,
            Some(date("2026-02-20T00:00:00Z")?),
            &json!([
                { "sku": "SKU-KB-1", "name": "Mechanical Keyboard", "qty": 1, "price": 89.99 }
            ]),
        )
        .await?;
    orders
        .upsert(
            user.id,
            "ORD-1003",
            OrderStatus::Pending,
            None,
            &json!([
                { "sku": "SKU-HEAD-1", "name": "Noise-Canceling Headphones", "qty": 1, "price": 199.99 }
            ]),
        )
        .await?;
    report.orders_upserted = 3;

    let invoices = InvoiceRepository::new(pool);
    invoices
        .upsert(
            user.id,
            "INV-2001",
            Decimal::new(19999, 2),
            InvoiceStatus::Paid,
            date("2026-02-01T00:00:00Z")?,
        )
        .await?;
    invoices
        .upsert(
            user.id,
            "INV-2002",
            Decimal::new(4999, 2),
            InvoiceStatus::Refunded,
            date("2026-02-05T00:00:00Z")?,
        )
        .await?;
    report.invoices_upserted = 2;

    let conversations = ConversationRepository::new(pool);
    if conversations.latest_for_user(user.id).await?.is_none() {
        let conversation = conversations.create(user.id).await?;
        for &(role, content) in SAMPLE_CONVERSATION {
            conversations
                .add_message(conversation.id, role, content)
                .await?;
        }
        report.conversation_created = true;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = memory_pool().await;

        let first = seed(&pool).await.expect("first seed");
        assert_eq!(first.faqs_inserted, 4);
        assert!(first.conversation_created);

        let second = seed(&pool).await.expect("second seed");
        assert_eq!(second.faqs_inserted, 0);
        assert!(!second.conversation_created);
    }

    #[tokio::test]
    async fn test_seeded_order_is_findable() {
        let pool = memory_pool().await;
        seed(&pool).await.expect("seed");

        let order = OrderRepository::new(&pool)
            .find_by_reference("ORD-1002")
            .await
            .expect("query")
            .expect("order exists");

        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_seeded_conversation_has_four_messages() {
        let pool = memory_pool().await;
        seed(&pool).await.expect("seed");

        let repo = ConversationRepository::new(&pool);
        let listed = repo.list_with_last_message().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0].last_message.as_deref(),
            Some("Please email it to me.")
        );
    }
}
