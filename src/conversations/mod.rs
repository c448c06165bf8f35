mod conversation;
mod list;
mod msg;
mod new;

use axum::{Router, routing::get};
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult, AppState,
    db::{
        channels, conversations::{self, Conversation},
        users::{self, Role, User},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list).post(new::create))
        .route(
            "/{id}",
            get(conversation::conversation)
                .patch(conversation::update)
                .delete(conversation::delete),
        )
        .route("/{id}/messages", get(msg::list).post(msg::send))
}

/// Attendants see every conversation, clients only the ones they take part in.
pub(crate) async fn visible_conversation(db_pool: &SqlitePool, user: &User, id: &str) -> AppResult<Conversation> {
    let Some(conversation) = conversations::get(db_pool, id).await? else {
        return Err(AppError::not_found("conversation not found"));
    };

    if user.role != Role::Attendant && !conversation.has_participant(&user.id) {
        return Err(AppError::Forbidden("access denied".into()));
    }

    Ok(conversation)
}

/// Rejects references to a missing channel or to users holding the wrong role.
pub(crate) async fn check_references(
    db_pool: &SqlitePool,
    channel_id: Option<&str>,
    client_id: Option<&str>,
    attendant_id: Option<&str>,
) -> AppResult<()> {
    if let Some(channel_id) = channel_id {
        if channels::get(db_pool, channel_id).await?.is_none() {
            return Err(AppError::bad_request("channel not found"));
        }
    }

    for (user_id, role, noun) in [
        (client_id, Role::Client, "client"),
        (attendant_id, Role::Attendant, "attendant"),
    ] {
        let Some(user_id) = user_id else {
            continue;
        };
        match users::get(db_pool, user_id).await? {
            Some(user) if user.role == role => {}
            _ => return Err(AppError::bad_request(format!("{noun} not found"))),
        }
    }

    Ok(())
}
