//! Order domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::{OrderId, OrderStatus, UserId};

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Human-facing order number (e.g., "ORD-1001").
    pub order_number: String,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Expected or actual delivery date, if known.
    pub delivery_date: Option<DateTime<Utc>>,
    /// Line items as a JSON array: `[{ "sku", "name", "qty", "price" }]`.
    pub items: serde_json::Value,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_serialization() {
        let order = Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            order_number: "ORD-1001".to_string(),
            status: OrderStatus::Delivered,
            delivery_date: None,
            items: serde_json::json!([{"sku": "SKU-MOUSE-1", "qty": 1}]),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&order).expect("serialize");
        assert!(json.contains("\"order_number\":\"ORD-1001\""));
        assert!(json.contains("\"status\":\"DELIVERED\""));
    }
}
