use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::anyhow;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    /// Avatars land in `<upload_dir>/avatars`, served under `/uploads`.
    pub upload_dir: PathBuf,
    pub secure_cookies: bool,
    pub session_days: i64,
    pub bcrypt_cost: u32,
    pub seed_test_user: bool,
}

impl Config {
    /// Reads the environment, after loading `.env` if there is one.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            info!("no .env loaded: {e}");
        }

        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://chatwave.db?mode=rwc")?,
            listen_addr: try_load("LISTEN_ADDR", "0.0.0.0:8080")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            secure_cookies: try_load("SECURE_COOKIES", "false")?,
            session_days: try_load("SESSION_DAYS", "7")?,
            bcrypt_cost: try_load("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?,
            seed_test_user: try_load("SEED_TEST_USER", "true")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = dotenv::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });

    value.parse().map_err(|e| {
        warn!("invalid {key} value {value:?}: {e}");
        anyhow!("environment variable {key} is invalid: {e}")
    })
}
