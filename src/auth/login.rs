use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    AppError, AppResult, AppState,
    db::users::{self, User},
    session::USER_ID,
};

use super::password;

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    username: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginRequest { username, password }): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::bad_request("invalid data"));
    }

    let invalid = || AppError::Unauthorized("invalid credentials".into());

    let Some(user) = users::get_by_username(&db_pool, &username).await? else {
        return Err(invalid());
    };
    if !password::verify(password, user.password.clone()).await? {
        return Err(invalid());
    }

    session.cycle_id().await?;
    session.insert(USER_ID, &user.id).await?;

    info!(user = %user.username, role = ?user.role, "logged in");
    Ok(Json(user))
}
