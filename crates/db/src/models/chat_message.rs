use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool, Type};
use ts_rs::TS;
use uuid::Uuid;

use crate::pagination::Pagination;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS)]
#[sqlx(type_name = "chat_message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    Human,
    Ai,
    System,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: ChatMessageRole,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateMessageContent {
    pub content: String,
}

const MESSAGE_COLUMNS: &str = "id, chat_id, role, content, created_at, updated_at";

impl ChatMessage {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Newest messages first, so a limit yields "the last N messages".
    pub async fn find_recent(
        pool: &SqlitePool,
        chat_id: Uuid,
        page: &Pagination,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages
             WHERE chat_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(chat_id)
        .bind(page.limit_or_unbounded())
        .bind(page.offset_or_zero())
        .fetch_all(pool)
        .await
    }

    /// Full history in creation order, for transcript display. Ties on
    /// created_at fall back to insertion order.
    pub async fn find_transcript(
        pool: &SqlitePool,
        chat_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages
             WHERE chat_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    /// Appends the HUMAN/AI pair of a completed exchange in one transaction:
    /// both rows become visible together or not at all. The owning chat's
    /// updated_at is bumped inside the same transaction, and every row shares
    /// a single clock read. Returns RowNotFound when the chat no longer
    /// exists.
    pub async fn append_pair(
        pool: &SqlitePool,
        chat_id: Uuid,
        human_content: &str,
        ai_content: &str,
    ) -> Result<(Self, Self), sqlx::Error> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let touched = sqlx::query("UPDATE chats SET updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let human = Self::insert(
            &mut *tx,
            Uuid::new_v4(),
            chat_id,
            ChatMessageRole::Human,
            human_content,
            now,
        )
        .await?;
        let ai = Self::insert(
            &mut *tx,
            Uuid::new_v4(),
            chat_id,
            ChatMessageRole::Ai,
            ai_content,
            now,
        )
        .await?;

        tx.commit().await?;
        Ok((human, ai))
    }

    async fn insert(
        conn: &mut SqliteConnection,
        id: Uuid,
        chat_id: Uuid,
        role: ChatMessageRole,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "INSERT INTO chat_messages (id, chat_id, role, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(chat_id)
        .bind(role)
        .bind(content)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    pub async fn update_content(
        pool: &SqlitePool,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "UPDATE chat_messages
             SET content = ?2, updated_at = ?3
             WHERE id = ?1
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(content)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
