use axum::{Json, debug_handler};

use crate::{AppState, db::users::User};

use super::CurrentUser;

#[debug_handler(state = AppState)]
pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
