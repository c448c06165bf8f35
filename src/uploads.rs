use std::{path::Path, sync::Arc};

use axum::{
    Json, Router, debug_handler,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use time::OffsetDateTime;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, Cors, CorsLayer},
    services::ServeDir,
};
use tracing::info;

use crate::{AppError, AppResult, AppState, auth::CurrentUser, config::Config};

pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;
const AVATAR_FIELD: &str = "avatar";
const IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvatarUploaded {
    avatar_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/avatar", post(avatar))
        // room for the multipart framing around a maximum size image
        .layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES + 64 * 1024))
}

/// Serves everything under `upload_dir` to any origin.
pub fn serve(upload_dir: &Path) -> Cors<ServeDir> {
    ServiceBuilder::new()
        .layer(CorsLayer::new().allow_origin(Any))
        .service(ServeDir::new(upload_dir))
}

/// Extension to store the image under, if both the file name and the
/// declared content type look like a supported image.
fn image_extension(file_name: &str, content_type: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let content_type = content_type.to_ascii_lowercase();

    let ext_ok = IMAGE_TYPES.contains(&ext.as_str());
    let type_ok = IMAGE_TYPES.iter().any(|t| content_type.contains(t));
    (ext_ok && type_ok).then_some(ext)
}

#[debug_handler(state = AppState)]
async fn avatar(
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<AvatarUploaded>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let ext = image_extension(
            field.file_name().unwrap_or_default(),
            field.content_type().unwrap_or_default(),
        )
        .ok_or_else(|| AppError::bad_request("only images are allowed (jpeg, jpg, png, gif)"))?;

        let data = field.bytes().await?;
        if data.len() > AVATAR_MAX_BYTES {
            return Err(AppError::bad_request("image is larger than 5 MB"));
        }

        let dir = config.upload_dir.join("avatars");
        tokio::fs::create_dir_all(&dir).await?;

        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let file_name = format!("{AVATAR_FIELD}-{millis}-{}.{ext}", rand::random_range(0..1_000_000_000u32));
        tokio::fs::write(dir.join(&file_name), &data).await?;

        info!(user = %user.username, file = %file_name, bytes = data.len(), "stored avatar");
        return Ok(Json(AvatarUploaded {
            avatar_url: format!("/uploads/avatars/{file_name}"),
        }));
    }

    Err(AppError::bad_request("no file uploaded"))
}
