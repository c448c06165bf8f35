pub mod appresult;
pub mod auth;
pub mod channels;
pub mod config;
pub mod conversations;
pub mod db;
pub mod protocol;
pub mod seed;
pub mod session;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use axum::{Router, extract::FromRef};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub use appresult::{AppError, AppResult};
use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
}

pub fn app(state: AppState) -> Router {
    let session_layer = session::layer(&state.config);
    let uploads = uploads::serve(&state.config.upload_dir);

    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/channels", channels::router())
        .nest("/conversations", conversations::router())
        .nest("/upload", uploads::router());

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
