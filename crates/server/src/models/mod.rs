//! Domain models for the support chat backend.
//!
//! # Models
//!
//! - `conversation` - Conversation history (conversations, stored messages,
//!   the chat wire message)
//! - `faq` - Product FAQ entries
//! - `invoice` - Billing invoices
//! - `order` - Customer orders
//! - `user` - Customer accounts

pub mod conversation;
pub mod faq;
pub mod invoice;
pub mod order;
pub mod user;

pub use conversation::{ChatMessage, Conversation, StoredMessage};
pub use faq::ProductFaq;
pub use invoice::Invoice;
pub use order::Order;
pub use user::User;
