use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult, AppState,
    auth::CurrentUser,
    db::messages::{self, Message},
};

use super::visible_conversation;

#[derive(Deserialize)]
pub(crate) struct SendMessage {
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Message>>> {
    let conversation = visible_conversation(&db_pool, &user, &id).await?;
    Ok(Json(messages::list(&db_pool, &conversation.id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(SendMessage { content }): Json<SendMessage>,
) -> AppResult<Json<Message>> {
    let conversation = visible_conversation(&db_pool, &user, &id).await?;
    if content.trim().is_empty() {
        return Err(AppError::bad_request("message content is required"));
    }

    Ok(Json(messages::create(&db_pool, &conversation.id, &user.id, &content).await?))
}
