//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::UserId;

/// A customer account.
///
/// There is no authentication; users exist so that orders, invoices, and
/// conversations have an owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique).
    pub email: String,
    /// Display name.
    pub name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
