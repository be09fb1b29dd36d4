//! Postgres pool creation and schema bootstrap
//!
//! Creates the single `songs` table on first start. Anything beyond
//! `CREATE TABLE IF NOT EXISTS` belongs to an external migration tool.

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_SONGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        id SERIAL PRIMARY KEY,
        name TEXT,
        artist TEXT,
        release_date DATE,
        text TEXT,
        link TEXT
    )
"#;

/// Open a connection pool against the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(config.connect_options()?)
        .await?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Connected to database"
    );

    Ok(pool)
}

/// Create the songs table if it does not exist (idempotent)
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_SONGS_TABLE).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
