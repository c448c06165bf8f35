//! bcrypt off the async workers.

use crate::AppResult;

pub async fn hash(password: String, cost: u32) -> AppResult<String> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
}

pub async fn verify(password: String, hash: String) -> AppResult<bool> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
