use std::sync::Arc;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    AppError, AppResult, AppState,
    auth::{Attendant, password},
    config::Config,
    db::{
        self,
        users::{self, NewUser, User, UserChanges},
    },
};

use super::RoleSegment;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateUser {
    username: String,
    password: String,
    name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateUser {
    username: Option<String>,
    password: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    avatar_url: Option<Option<String>>,
}

/// Tells an explicit `null` apart from a missing field.
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
    Option::deserialize(deserializer).map(Some)
}

fn check_username(username: &str) -> AppResult<()> {
    if username.chars().count() < 3 {
        return Err(AppError::bad_request("username must have at least 3 characters"));
    }
    Ok(())
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::bad_request("password must have at least 6 characters"));
    }
    Ok(())
}

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    Ok(())
}

fn username_taken(err: sqlx::Error) -> AppError {
    match db::unique_violation_field(&err).as_deref() {
        Some("username") => AppError::bad_request("username already exists"),
        _ => err.into(),
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    Path(role): Path<RoleSegment>,
    State(db_pool): State<SqlitePool>,
    _attendant: Attendant,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(users::list_by_role(&db_pool, role.role()).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    Path(role): Path<RoleSegment>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Attendant(by): Attendant,
    Json(CreateUser { username, password, name, avatar_url }): Json<CreateUser>,
) -> AppResult<Json<User>> {
    check_username(&username)?;
    check_password(&password)?;
    check_name(&name)?;

    if users::get_by_username(&db_pool, &username).await?.is_some() {
        return Err(AppError::bad_request("username already exists"));
    }

    let new = NewUser {
        username,
        password: password::hash(password, config.bcrypt_cost).await?,
        name,
        role: role.role(),
        avatar_url,
    };
    let user = users::create(&db_pool, new).await.map_err(username_taken)?;

    info!(by = %by.username, user = %user.username, "created {}", role.noun());
    Ok(Json(user))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    Path((role, id)): Path<(RoleSegment, String)>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    _attendant: Attendant,
    Json(UpdateUser { username, password, name, avatar_url }): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    if let Some(username) = &username {
        check_username(username)?;
    }
    if let Some(name) = &name {
        check_name(name)?;
    }
    let password = match password {
        Some(password) => {
            check_password(&password)?;
            Some(password::hash(password, config.bcrypt_cost).await?)
        }
        None => None,
    };

    let changes = UserChanges { username, password, name, avatar_url };
    let Some(user) = users::update(&db_pool, &id, role.role(), changes)
        .await
        .map_err(username_taken)?
    else {
        return Err(AppError::not_found(format!("{} not found", role.noun())));
    };

    Ok(Json(user))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    Path((role, id)): Path<(RoleSegment, String)>,
    State(db_pool): State<SqlitePool>,
    Attendant(by): Attendant,
) -> AppResult<Json<Value>> {
    if by.id == id {
        return Err(AppError::bad_request("you cannot delete your own account"));
    }

    let deleted = users::delete(&db_pool, &id, role.role()).await.map_err(|err| {
        if db::is_foreign_key_violation(&err) {
            AppError::bad_request(format!("{} still has conversation history", role.noun()))
        } else {
            err.into()
        }
    })?;
    if !deleted {
        return Err(AppError::not_found(format!("{} not found", role.noun())));
    }

    info!(by = %by.username, %id, "deleted {}", role.noun());
    Ok(Json(json!({ "success": true })))
}
