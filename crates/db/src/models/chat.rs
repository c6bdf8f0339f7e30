use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use crate::pagination::Pagination;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Chat {
    pub id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateChat {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateChatTitle {
    pub title: String,
}

impl Chat {
    pub async fn find_all(pool: &SqlitePool, page: &Pagination) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"SELECT id, title, created_at, updated_at
               FROM chats
               ORDER BY created_at DESC, rowid DESC
               LIMIT ?1 OFFSET ?2"#,
        )
        .bind(page.limit_or_unbounded())
        .bind(page.offset_or_zero())
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"SELECT id, title, created_at, updated_at
               FROM chats
               WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateChat,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Chat>(
            r#"INSERT INTO chats (id, title, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?3)
               RETURNING id, title, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.title.as_deref())
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update_title(
        pool: &SqlitePool,
        id: Uuid,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"UPDATE chats
               SET title = ?2, updated_at = ?3
               WHERE id = ?1
               RETURNING id, title, created_at, updated_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
