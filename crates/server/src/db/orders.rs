//! Database operations for orders.

use chrono::{DateTime, Utc};

use helpdesk_core::{OrderId, OrderStatus, UserId};

use super::{DbPool, RepositoryError};
use crate::models::Order;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    order_number: String,
    status: OrderStatus,
    delivery_date: Option<DateTime<Utc>>,
    items: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            order_number: row.order_number,
            status: row.status,
            delivery_date: row.delivery_date,
            items: row.items,
            created_at: row.created_at,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Find an order by numeric ID or by its order number.
    ///
    /// Customers quote either form ("3" or "ORD-1003"), so the lookup tools
    /// accept both.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, RepositoryError> {
        // A non-numeric reference can never match an ID; -1 never matches.
        let id: i32 = reference.trim().parse().unwrap_or(-1);

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, order_number, status, delivery_date, items, created_at
            FROM orders
            WHERE id = ?1 OR order_number = ?2
            ",
        )
        .bind(id)
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an order, replacing its mutable fields if the order number
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        order_number: &str,
        status: OrderStatus,
        delivery_date: Option<DateTime<Utc>>,
        items: &serde_json::Value,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, order_number, status, delivery_date, items, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(order_number) DO UPDATE SET
                status = excluded.status,
                delivery_date = excluded.delivery_date,
                items = excluded.items
            RETURNING id, user_id, order_number, status, delivery_date, items, created_at
            ",
        )
        .bind(user_id)
        .bind(order_number)
        .bind(status)
        .bind(delivery_date)
        .bind(items.clone())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserRepository;
    use crate::db::test_support::memory_pool;

    async fn seed_order(pool: &DbPool) -> Order {
        let user = UserRepository::new(pool)
            .upsert("jane@example.com", "Jane Doe")
            .await
            .expect("user");

        OrderRepository::new(pool)
            .upsert(
                user.id,
                "ORD-1001",
                OrderStatus::Delivered,
                None,
                &serde_json::json!([{"sku": "SKU-MOUSE-1", "qty": 1}]),
            )
            .await
            .expect("order")
    }

    #[tokio::test]
    async fn test_find_by_order_number() {
        let pool = memory_pool().await;
        let seeded = seed_order(&pool).await;

        let found = OrderRepository::new(&pool)
            .find_by_reference("ORD-1001")
            .await
            .expect("query")
            .expect("order exists");

        assert_eq!(found.id, seeded.id);
        assert_eq!(found.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_find_by_numeric_id() {
        let pool = memory_pool().await;
        let seeded = seed_order(&pool).await;

        let found = OrderRepository::new(&pool)
            .find_by_reference(&seeded.id.to_string())
            .await
            .expect("query")
            .expect("order exists");

        assert_eq!(found.order_number, "ORD-1001");
    }

    #[tokio::test]
    async fn test_find_missing_order() {
        let pool = memory_pool().await;
        seed_order(&pool).await;

        let found = OrderRepository::new(&pool)
            .find_by_reference("ORD-9999")
            .await
            .expect("query");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_status() {
        let pool = memory_pool().await;
        let seeded = seed_order(&pool).await;

        let updated = OrderRepository::new(&pool)
            .upsert(
                seeded.user_id,
                "ORD-1001",
                OrderStatus::Shipped,
                None,
                &seeded.items,
            )
            .await
            .expect("upsert");

        assert_eq!(updated.id, seeded.id);
        assert_eq!(updated.status, OrderStatus::Shipped);
    }
}
