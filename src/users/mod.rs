mod crud;

use axum::{
    Router,
    routing::{get, patch},
};
use serde::Deserialize;

use crate::{AppState, db::users::Role};

/// `/api/users/attendants` and `/api/users/clients` share their handlers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RoleSegment {
    Attendants,
    Clients,
}

impl RoleSegment {
    fn role(self) -> Role {
        match self {
            RoleSegment::Attendants => Role::Attendant,
            RoleSegment::Clients => Role::Client,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            RoleSegment::Attendants => "attendant",
            RoleSegment::Clients => "client",
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{role}", get(crud::list).post(crud::create))
        .route("/{role}/{id}", patch(crud::update).delete(crud::delete))
}
