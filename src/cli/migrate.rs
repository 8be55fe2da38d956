//! Migrate command - creates the database schema and exits

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::db::{self, PostgresConfig};
use crate::infrastructure::logging;

/// Create all tables and indexes, then exit
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    let pool = db::connect(
        &PostgresConfig::new(&config.database.url)
            .with_max_connections(config.database.max_connections)
            .with_min_connections(config.database.min_connections),
    )
    .await?;

    db::ensure_schema(&pool).await?;

    info!("Schema is up to date");

    Ok(())
}
