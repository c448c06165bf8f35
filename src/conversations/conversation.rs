use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    AppError, AppResult, AppState,
    auth::{Attendant, CurrentUser},
    db::conversations::{self, Conversation, ConversationChanges},
};

use super::{check_references, visible_conversation};

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Conversation>> {
    Ok(Json(visible_conversation(&db_pool, &user, &id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    _attendant: Attendant,
    Json(changes): Json<ConversationChanges>,
) -> AppResult<Json<Conversation>> {
    check_references(
        &db_pool,
        changes.channel_id.as_deref(),
        changes.client_id.as_deref(),
        changes.attendant_id.as_deref(),
    )
    .await?;

    let Some(conversation) = conversations::update(&db_pool, &id, changes).await? else {
        return Err(AppError::not_found("conversation not found"));
    };

    Ok(Json(conversation))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    Attendant(by): Attendant,
) -> AppResult<Json<Value>> {
    if !conversations::delete(&db_pool, &id).await? {
        return Err(AppError::not_found("conversation not found"));
    }

    info!(by = %by.username, %id, "deleted conversation");
    Ok(Json(json!({ "success": true })))
}
