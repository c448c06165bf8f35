use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn list(db_pool: &SqlitePool, conversation_id: &str) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM messages WHERE conversation_id=? ORDER BY created_at, id")
        .bind(conversation_id)
        .fetch_all(db_pool)
        .await
}

/// Stores the message and marks its conversation as recently active.
pub async fn create(
    db_pool: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> Result<Message, sqlx::Error> {
    create_at(db_pool, conversation_id, sender_id, content, OffsetDateTime::now_utc()).await
}

pub(crate) async fn create_at(
    db_pool: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
    at: OffsetDateTime,
) -> Result<Message, sqlx::Error> {
    let now = super::timestamp(at)?;
    let mut tx = db_pool.begin().await?;

    let message = sqlx::query_as(
        "INSERT INTO messages (id,conversation_id,sender_id,content,created_at) VALUES (?,?,?,?,?) RETURNING *",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at=? WHERE id=?")
        .bind(&now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(message)
}
