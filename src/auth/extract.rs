use anyhow::anyhow;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppError,
    db::users::{self, Role, User},
    session::USER_ID,
};

/// The user whose id is stored in the session cookie.
pub struct CurrentUser(pub User);

/// A [`CurrentUser`] holding the attendant role.
pub struct Attendant(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| anyhow!(msg))?;

        let Some(user_id) = session.get::<String>(USER_ID).await? else {
            return Err(AppError::Unauthorized("not authenticated".into()));
        };

        let db_pool = SqlitePool::from_ref(state);
        let Some(user) = users::get(&db_pool, &user_id).await? else {
            return Err(AppError::Unauthorized("user not found".into()));
        };

        Ok(CurrentUser(user))
    }
}

impl<S> FromRequestParts<S> for Attendant
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Attendant {
            return Err(AppError::Forbidden("access denied: attendants only".into()));
        }
        Ok(Attendant(user))
    }
}
