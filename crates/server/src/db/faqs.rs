//! Database operations for product FAQs.

use chrono::{DateTime, Utc};

use helpdesk_core::FaqId;

use super::{DbPool, RepositoryError};
use crate::models::ProductFaq;

/// Maximum number of FAQ entries returned by a search.
const SEARCH_LIMIT: i64 = 5;

#[derive(Debug, sqlx::FromRow)]
struct FaqRow {
    id: i32,
    question: String,
    answer: String,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FaqRow> for ProductFaq {
    fn from(row: FaqRow) -> Self {
        Self {
            id: FaqId::new(row.id),
            question: row.question,
            answer: row.answer,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for FAQ database operations.
pub struct FaqRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FaqRepository<'a> {
    /// Create a new FAQ repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Search FAQ entries by substring over question, answer, and category.
    ///
    /// Case-insensitive; returns the five most recently updated matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<ProductFaq>, RepositoryError> {
        let rows = sqlx::query_as::<_, FaqRow>(
            r"
            SELECT id, question, answer, category, created_at, updated_at
            FROM product_faqs
            WHERE question LIKE '%' || ?1 || '%'
               OR answer LIKE '%' || ?1 || '%'
               OR category LIKE '%' || ?1 || '%'
            ORDER BY updated_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(query)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a FAQ entry unless one with the same question already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_missing(
        &self,
        question: &str,
        answer: &str,
        category: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO product_faqs (question, answer, category, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?4, ?4
            WHERE NOT EXISTS (SELECT 1 FROM product_faqs WHERE question = ?1)
            ",
        )
        .bind(question)
        .bind(answer)
        .bind(category)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
