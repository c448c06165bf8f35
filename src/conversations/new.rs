use axum::{Json, debug_handler, extract::State};
use rand::{SeedableRng, rngs::StdRng};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{
    AppError, AppResult, AppState,
    auth::Attendant,
    db::conversations::{Conversation, NewConversation},
    protocol::{self, ProtocolError},
};

use super::check_references;

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    Attendant(by): Attendant,
    Json(new): Json<NewConversation>,
) -> AppResult<Json<Conversation>> {
    check_references(
        &db_pool,
        Some(new.channel_id.as_str()),
        Some(new.client_id.as_str()),
        Some(new.attendant_id.as_str()),
    )
    .await?;

    let mut rng = StdRng::from_os_rng();
    let conversation = match protocol::insert_with_unique_protocol(&db_pool, &mut rng, &new).await {
        Ok(conversation) => conversation,
        Err(err) => {
            match &err {
                ProtocolError::Exhausted { attempts } => {
                    error!(attempts, "conversation not created: no free protocol")
                }
                ProtocolError::Store(cause) => error!("conversation not created: {cause}"),
            }
            return Err(AppError::from(err));
        }
    };

    info!(
        by = %by.username,
        id = %conversation.id,
        protocol = %conversation.protocol,
        "created conversation"
    );
    Ok(Json(conversation))
}
