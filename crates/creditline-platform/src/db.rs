use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

/// Tables the durable credit line store is expected to provide.
pub const REQUIRED_TABLES: [&str; 5] = [
    "borrowers",
    "credit_lines",
    "risk_evaluations",
    "transactions",
    "events",
];

pub async fn connect_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("failed to connect to postgres")?;

    info!("connected to postgres");
    Ok(pool)
}

/// Returns the required tables missing from the `public` schema.
pub async fn validate_schema(pool: &PgPool) -> Result<Vec<String>> {
    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::TEXT
        FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_name = ANY($1)
        "#,
    )
    .bind(&REQUIRED_TABLES[..])
    .fetch_all(pool)
    .await
    .context("failed to inspect information_schema")?;

    Ok(missing_tables(&present))
}

pub(crate) fn missing_tables(present: &[String]) -> Vec<String> {
    REQUIRED_TABLES
        .iter()
        .filter(|table| !present.iter().any(|name| name.as_str() == **table))
        .map(|table| table.to_string())
        .collect()
}
