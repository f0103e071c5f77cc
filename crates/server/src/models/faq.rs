//! Product FAQ domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::FaqId;

/// A product FAQ entry searchable by the support agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFaq {
    /// Unique FAQ ID.
    pub id: FaqId,
    /// The question text.
    pub question: String,
    /// The answer text.
    pub answer: String,
    /// Optional category (e.g., "Returns", "Shipping").
    pub category: Option<String>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}
