use std::sync::Arc;

use chatwave::{AppState, config::Config, db, seed};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;
    let db_pool = db::connect(&config.database_url).await?;
    seed::run(&db_pool, &config).await?;

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(address = %config.listen_addr, "listening");

    let app_state = AppState {
        db_pool,
        config: Arc::new(config),
    };
    axum::serve(listener, chatwave::app(app_state)).await?;
    Ok(())
}
