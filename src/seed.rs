//! Startup data so a fresh database is usable right away.

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    AppResult,
    auth::password,
    config::Config,
    db::{
        channels::{self, ChannelKind, NewChannel},
        users::{self, NewUser, Role},
    },
};

pub const TEST_USERNAME: &str = "teste";
pub const TEST_PASSWORD: &str = "senha123";
pub const WEB_CHANNEL: &str = "web";

pub async fn run(db_pool: &SqlitePool, config: &Config) -> AppResult<()> {
    if config.seed_test_user {
        test_user(db_pool, config.bcrypt_cost).await?;
    }
    web_channel(db_pool).await
}

async fn test_user(db_pool: &SqlitePool, bcrypt_cost: u32) -> AppResult<()> {
    if users::get_by_username(db_pool, TEST_USERNAME).await?.is_some() {
        return Ok(());
    }

    users::create(
        db_pool,
        NewUser {
            username: TEST_USERNAME.to_owned(),
            password: password::hash(TEST_PASSWORD.to_owned(), bcrypt_cost).await?,
            name: "Test User".to_owned(),
            role: Role::Attendant,
            avatar_url: None,
        },
    )
    .await?;

    info!(username = TEST_USERNAME, "created test attendant");
    Ok(())
}

async fn web_channel(db_pool: &SqlitePool) -> AppResult<()> {
    if channels::get_by_name(db_pool, WEB_CHANNEL).await?.is_some() {
        return Ok(());
    }

    channels::create(
        db_pool,
        NewChannel {
            name: WEB_CHANNEL.to_owned(),
            description: Some("Default web channel".to_owned()),
            kind: ChannelKind::Web,
            is_active: true,
        },
    )
    .await?;

    info!(name = WEB_CHANNEL, "created channel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::db;

    fn config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_owned(),
            listen_addr: "127.0.0.1:0".to_owned(),
            upload_dir: PathBuf::from("uploads"),
            secure_cookies: false,
            session_days: 7,
            bcrypt_cost: 4,
            seed_test_user: true,
        }
    }

    #[tokio::test]
    async fn seeding_twice_is_harmless() {
        let db_pool = db::connect("sqlite::memory:").await.unwrap();
        run(&db_pool, &config()).await.unwrap();
        run(&db_pool, &config()).await.unwrap();

        assert_eq!(users::list_by_role(&db_pool, Role::Attendant).await.unwrap().len(), 1);
        assert_eq!(channels::list(&db_pool).await.unwrap().len(), 1);
    }
}
