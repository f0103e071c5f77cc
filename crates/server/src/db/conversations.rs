//! Database operations for conversations and messages.

use chrono::{DateTime, Utc};

use helpdesk_core::{ChatRole, ConversationId, MessageId, UserId};

use super::{DbPool, RepositoryError};
use crate::models::{Conversation, StoredMessage};

/// Maximum number of conversations returned by a listing.
const LIST_LIMIT: i64 = 20;

/// Maximum number of messages returned by a history search.
const SEARCH_LIMIT: i64 = 5;

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: ConversationId::new(row.id),
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    conversation_id: i32,
    role: ChatRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for StoredMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            conversation_id: ConversationId::new(row.conversation_id),
            role: row.role,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// A conversation with its most recent message content.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationWithLastMessage {
    /// Conversation ID.
    pub id: i32,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Content of the most recent message, if any.
    pub last_message: Option<String>,
}

/// Repository for conversation database operations.
pub struct ConversationRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ConversationRepository<'a> {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get a conversation by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            "SELECT id, user_id, created_at, updated_at FROM conversations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get the most recently updated conversation for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r"
            SELECT id, user_id, created_at, updated_at
            FROM conversations
            WHERE user_id = ?1
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new conversation for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, user_id: UserId) -> Result<Conversation, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ConversationRow>(
            r"
            INSERT INTO conversations (user_id, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            RETURNING id, user_id, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Append a message to a conversation and bump its `updated_at`.
    ///
    /// Both writes happen in one transaction so a conversation can never be
    /// more recent than its newest message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either write fails.
    pub async fn add_message(
        &self,
        conversation_id: ConversationId,
        role: ChatRole,
        content: &str,
    ) -> Result<StoredMessage, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, MessageRow>(
            r"
            INSERT INTO messages (conversation_id, role, content, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, conversation_id, role, content, created_at
            ",
        )
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// List the most recently updated conversations with their latest
    /// message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_last_message(
        &self,
    ) -> Result<Vec<ConversationWithLastMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationWithLastMessage>(
            r"
            SELECT c.id, c.updated_at,
                   (SELECT m.content
                    FROM messages m
                    WHERE m.conversation_id = c.id
                    ORDER BY m.created_at DESC, m.id DESC
                    LIMIT 1) AS last_message
            FROM conversations c
            ORDER BY c.updated_at DESC, c.id DESC
            LIMIT ?1
            ",
        )
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get all messages in a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn messages_for(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Search message history by content substring, newest first.
    ///
    /// Case-insensitive; returns the five most recent matches across all
    /// conversations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_messages(&self, query: &str) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE content LIKE '%' || ?1 || '%'
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(query)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
