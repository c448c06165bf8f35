use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::protocol::{ConversationStore, InsertError, Protocol};

use super::{timestamp, unique_violation_field};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Open,
    Waiting,
    Closed,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub protocol: Protocol,
    pub title: Option<String>,
    pub channel_id: String,
    pub client_id: String,
    pub attendant_id: String,
    pub status: ConversationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.client_id == user_id || self.attendant_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub title: Option<String>,
    pub channel_id: String,
    pub client_id: String,
    pub attendant_id: String,
    #[serde(default)]
    pub status: ConversationStatus,
}

/// The protocol is not part of this: it never changes after creation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationChanges {
    pub title: Option<String>,
    pub channel_id: Option<String>,
    pub client_id: Option<String>,
    pub attendant_id: Option<String>,
    pub status: Option<ConversationStatus>,
}

impl ConversationStore for SqlitePool {
    type Error = sqlx::Error;

    async fn insert_conversation(
        &self,
        new: &NewConversation,
        protocol: &Protocol,
    ) -> Result<Conversation, InsertError<sqlx::Error>> {
        let now = timestamp(OffsetDateTime::now_utc()).map_err(InsertError::Other)?;
        sqlx::query_as(
            r#"INSERT INTO conversations (id,protocol,title,channel_id,client_id,attendant_id,status,created_at,updated_at)
            VALUES (?,?,?,?,?,?,?,?,?)
            RETURNING *"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(protocol)
        .bind(&new.title)
        .bind(&new.channel_id)
        .bind(&new.client_id)
        .bind(&new.attendant_id)
        .bind(new.status)
        .bind(&now)
        .bind(&now)
        .fetch_one(self)
        .await
        .map_err(|err| match unique_violation_field(&err) {
            Some(field) => InsertError::UniqueViolation { field },
            None => InsertError::Other(err),
        })
    }
}

pub async fn get(db_pool: &SqlitePool, id: &str) -> Result<Option<Conversation>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM conversations WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn list_all(db_pool: &SqlitePool) -> Result<Vec<Conversation>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM conversations ORDER BY updated_at DESC, id DESC")
        .fetch_all(db_pool)
        .await
}

pub async fn list_for_user(db_pool: &SqlitePool, user_id: &str) -> Result<Vec<Conversation>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM conversations WHERE client_id=? OR attendant_id=? ORDER BY updated_at DESC, id DESC",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db_pool)
    .await
}

pub async fn update(
    db_pool: &SqlitePool,
    id: &str,
    changes: ConversationChanges,
) -> Result<Option<Conversation>, sqlx::Error> {
    let now = timestamp(OffsetDateTime::now_utc())?;
    sqlx::query_as(
        r#"UPDATE conversations SET
            title=COALESCE(?,title),
            channel_id=COALESCE(?,channel_id),
            client_id=COALESCE(?,client_id),
            attendant_id=COALESCE(?,attendant_id),
            status=COALESCE(?,status),
            updated_at=?
        WHERE id=?
        RETURNING *"#,
    )
    .bind(changes.title)
    .bind(changes.channel_id)
    .bind(changes.client_id)
    .bind(changes.attendant_id)
    .bind(changes.status)
    .bind(now)
    .bind(id)
    .fetch_optional(db_pool)
    .await
}

pub async fn delete(db_pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM conversations WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
