//! Business logic services.
//!
//! # Services
//!
//! - `agent` - Router agent orchestration (tool loop, quota mapping)
//! - `agents` - Static registry of exposed agents
//! - `conversation` - Conversation history persistence

pub mod agent;
pub mod agents;
pub mod conversation;

pub use agent::{AgentError, AgentOutcome, ROUTER_SYSTEM_PROMPT, RouterAgent, TokenUsage};
pub use agents::AgentInfo;
pub use conversation::{
    ConversationDetail, ConversationError, ConversationMessage, ConversationService,
    ConversationSummary,
};
