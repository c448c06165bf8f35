use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Attendant,
    Client,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewUser {
    pub username: String,
    /// Already hashed.
    pub password: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

#[derive(Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` clears the avatar.
    pub avatar_url: Option<Option<String>>,
}

pub async fn get(db_pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn get_by_username(db_pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

pub async fn list_by_role(db_pool: &SqlitePool, role: Role) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE role=? ORDER BY name, id")
        .bind(role)
        .fetch_all(db_pool)
        .await
}

pub async fn create(db_pool: &SqlitePool, new: NewUser) -> Result<User, sqlx::Error> {
    let now = super::timestamp(OffsetDateTime::now_utc())?;
    sqlx::query_as(
        "INSERT INTO users (id,username,password,name,role,avatar_url,created_at) VALUES (?,?,?,?,?,?,?) RETURNING *",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(new.username)
    .bind(new.password)
    .bind(new.name)
    .bind(new.role)
    .bind(new.avatar_url)
    .bind(now)
    .fetch_one(db_pool)
    .await
}

/// Applies the fields that are set. Only touches a user holding `role`.
pub async fn update(
    db_pool: &SqlitePool,
    id: &str,
    role: Role,
    changes: UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        r#"UPDATE users SET
            username=COALESCE(?,username),
            password=COALESCE(?,password),
            name=COALESCE(?,name),
            avatar_url=CASE WHEN ? THEN ? ELSE avatar_url END
        WHERE id=? AND role=?
        RETURNING *"#,
    )
    .bind(changes.username)
    .bind(changes.password)
    .bind(changes.name)
    .bind(changes.avatar_url.is_some())
    .bind(changes.avatar_url.flatten())
    .bind(id)
    .bind(role)
    .fetch_optional(db_pool)
    .await
}

pub async fn delete(db_pool: &SqlitePool, id: &str, role: Role) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id=? AND role=?")
        .bind(id)
        .bind(role)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
