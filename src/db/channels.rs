use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChannelKind {
    Web,
    Whatsapp,
    Telegram,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChannel {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

pub async fn list(db_pool: &SqlitePool) -> Result<Vec<Channel>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM channels ORDER BY name")
        .fetch_all(db_pool)
        .await
}

pub async fn get(db_pool: &SqlitePool, id: &str) -> Result<Option<Channel>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM channels WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn get_by_name(db_pool: &SqlitePool, name: &str) -> Result<Option<Channel>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM channels WHERE name=?")
        .bind(name)
        .fetch_optional(db_pool)
        .await
}

pub async fn create(db_pool: &SqlitePool, new: NewChannel) -> Result<Channel, sqlx::Error> {
    let now = super::timestamp(OffsetDateTime::now_utc())?;
    sqlx::query_as(
        "INSERT INTO channels (id,name,description,kind,is_active,created_at) VALUES (?,?,?,?,?,?) RETURNING *",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(new.name)
    .bind(new.description)
    .bind(new.kind)
    .bind(new.is_active)
    .bind(now)
    .fetch_one(db_pool)
    .await
}
