use axum::{
    Json, Router, debug_handler,
    extract::State,
    routing::get,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    AppError, AppResult, AppState,
    auth::{Attendant, CurrentUser},
    db::{
        self,
        channels::{self, Channel, NewChannel},
    },
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create))
}

#[debug_handler(state = AppState)]
async fn list(State(db_pool): State<SqlitePool>, _user: CurrentUser) -> AppResult<Json<Vec<Channel>>> {
    Ok(Json(channels::list(&db_pool).await?))
}

#[debug_handler(state = AppState)]
async fn create(
    State(db_pool): State<SqlitePool>,
    Attendant(by): Attendant,
    Json(new): Json<NewChannel>,
) -> AppResult<Json<Channel>> {
    if new.name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }

    let channel = channels::create(&db_pool, new).await.map_err(|err| {
        match db::unique_violation_field(&err).as_deref() {
            Some("name") => AppError::bad_request("channel already exists"),
            _ => err.into(),
        }
    })?;

    info!(by = %by.username, channel = %channel.name, "created channel");
    Ok(Json(channel))
}
