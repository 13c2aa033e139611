// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use expense_manager::{backend, config::AppConfig, database, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env()?;

    let pool = database::db::connection::get_db_pool(&config)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url))?;
    database::db::migrate::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Starting Backend Server...");
    backend::run_server(pool, &config).await
}
