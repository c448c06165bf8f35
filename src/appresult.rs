use anyhow::anyhow;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{
    db,
    protocol::{InsertError, ProtocolError},
};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(err) => {
                error!("{err:?}");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(bcrypt::BcryptError);
apperr_impl!(std::io::Error);
apperr_impl!(tokio::task::JoinError);

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl From<InsertError<sqlx::Error>> for AppError {
    fn from(err: InsertError<sqlx::Error>) -> Self {
        match err {
            InsertError::UniqueViolation { field } => Self::BadRequest(format!("{field} already exists")),
            InsertError::Other(err) if db::is_foreign_key_violation(&err) => {
                Self::bad_request("referenced channel or user does not exist")
            }
            InsertError::Other(err) => err.into(),
        }
    }
}

impl From<ProtocolError<sqlx::Error>> for AppError {
    fn from(err: ProtocolError<sqlx::Error>) -> Self {
        match err {
            ProtocolError::Exhausted { attempts } => {
                Self::Internal(anyhow!("failed to create conversation: protocol space exhausted after {attempts} attempts"))
            }
            ProtocolError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::protocol;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, json) = body(AppError::Forbidden("access denied".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "access denied");
    }

    #[tokio::test]
    async fn missing_reference_on_insert_is_a_bad_request() {
        let db_pool = db::connect("sqlite::memory:").await.unwrap();
        let mut new = db::conversations::tests::participants(&db_pool).await;
        new.client_id = "gone".to_owned();

        let err = protocol::insert_with_unique_protocol(&db_pool, &mut rand::rng(), &new)
            .await
            .unwrap_err();
        let (status, json) = body(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "referenced channel or user does not exist");
    }

    #[tokio::test]
    async fn exhaustion_is_an_opaque_internal_error() {
        let (status, json) = body(ProtocolError::<sqlx::Error>::Exhausted { attempts: 10 }.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "internal server error");
    }
}
