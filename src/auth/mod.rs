mod extract;
mod login;
mod logout;
mod me;
pub mod password;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use extract::{Attendant, CurrentUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/me", get(me::me))
}
