//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Stored in the database as SCREAMING_SNAKE_CASE text, matching the values
/// surfaced to the agent tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Shipped => write!(f, "SHIPPED"),
            Self::Delivered => write!(f, "DELIVERED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Invoice payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl InvoiceStatus {
    /// Whether this status means the invoice amount was refunded.
    #[must_use]
    pub const fn is_refunded(self) -> bool {
        matches!(self, Self::Refunded)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// Chat message role.
///
/// The API accepts and returns lowercase roles; the same encoding is used
/// for the `messages.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("invalid chat role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Delivered).expect("serialize");
        assert_eq!(json, "\"DELIVERED\"");

        let status: OrderStatus = serde_json::from_str("\"SHIPPED\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_invoice_status_refunded() {
        assert!(InvoiceStatus::Refunded.is_refunded());
        assert!(!InvoiceStatus::Paid.is_refunded());
    }

    #[test]
    fn test_chat_role_serde_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");

        let role: ChatRole = serde_json::from_str("\"system\"").expect("deserialize");
        assert_eq!(role, ChatRole::System);
    }

    #[test]
    fn test_chat_role_from_str() {
        assert_eq!("user".parse::<ChatRole>(), Ok(ChatRole::User));
        assert!("tool".parse::<ChatRole>().is_err());
    }
}
