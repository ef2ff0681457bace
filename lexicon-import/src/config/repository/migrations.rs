//! Database connection and schema management

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Tables the importer writes to
const REQUIRED_TABLES: &[&str] = &[
    "grammar",
    "semantic_domains",
    "speakers",
    "words",
    "word_speakers",
    "import_runs",
];

/// Open a connection pool for a SQLite URL or file path
///
/// The database file is created when missing. Foreign keys are enforced.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    let options = SqliteConnectOptions::from_str(&url)
        .with_context(|| format!("Invalid database URL: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", database_url))?;

    debug!("Connected to {}", database_url);
    Ok(pool)
}

/// Apply embedded migrations; already-applied migrations are skipped
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database schema is up to date");
    Ok(())
}

/// Check that a pre-existing database carries the expected tables
pub async fn verify_schema(pool: &SqlitePool) -> Result<()> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await
            .context("Failed to inspect database schema")?;

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|table| !rows.iter().any(|(name,)| name == table))
        .collect();

    if !missing.is_empty() {
        bail!(
            "Database is missing tables: {} (run without --no-migrate to create them)",
            missing.join(", ")
        );
    }

    Ok(())
}

/// Fresh in-memory database with the schema applied
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
