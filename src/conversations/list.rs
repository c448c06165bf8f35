use axum::{Json, debug_handler, extract::State};
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    auth::CurrentUser,
    db::{
        conversations::{self, Conversation},
        users::Role,
    },
};

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Conversation>>> {
    let conversations = match user.role {
        Role::Attendant => conversations::list_all(&db_pool).await?,
        Role::Client => conversations::list_for_user(&db_pool, &user.id).await?,
    };
    Ok(Json(conversations))
}
