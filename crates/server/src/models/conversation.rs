//! Conversation history domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::{ChatRole, ConversationId, MessageId, UserId};

/// A conversation between a customer and the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID.
    pub id: ConversationId,
    /// Customer who owns this conversation.
    pub user_id: UserId,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// When the conversation last received a message.
    pub updated_at: DateTime<Utc>,
}

/// A persisted message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Role of the message sender.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

/// A chat message as sent over the API.
///
/// This is the wire shape accepted by the chat endpoints and fed to the
/// router agent; it carries no ID or timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_round_trip() {
        let json = r#"{"role":"user","content":"Where is my order?"}"#;
        let message: ChatMessage = serde_json::from_str(json).expect("deserialize");
        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.content, "Where is my order?");

        let back = serde_json::to_string(&message).expect("serialize");
        assert_eq!(back, json);
    }

    #[test]
    fn test_chat_message_rejects_unknown_role() {
        let json = r#"{"role":"tool","content":"hi"}"#;
        assert!(serde_json::from_str::<ChatMessage>(json).is_err());
    }
}
