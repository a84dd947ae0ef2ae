//! SQLite pool setup and schema

pub mod repository;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open (and create if missing) the database at `path` and ensure the schema
pub async fn open(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Open an in-memory database (used by tests); a single connection keeps all
/// queries on the same memory store.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let options =
        SqliteConnectOptions::from_str("sqlite::memory:").context("Invalid sqlite URL")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS countries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        code TEXT NOT NULL UNIQUE,
        alpha3 TEXT NOT NULL UNIQUE,
        flag_emoji TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS shipping_lines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category TEXT NOT NULL DEFAULT 'INTER ISLAND'
    )",
    "CREATE TABLE IF NOT EXISTS cargo_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category TEXT NOT NULL DEFAULT 'GC'
    )",
    "CREATE TABLE IF NOT EXISTS ships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        country_id INTEGER NOT NULL REFERENCES countries(id),
        shipping_line_id INTEGER NOT NULL REFERENCES shipping_lines(id)
    )",
    "CREATE TABLE IF NOT EXISTS ship_operations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        ship_id INTEGER NOT NULL REFERENCES ships(id),
        cargo_type_id INTEGER NOT NULL REFERENCES cargo_types(id),
        operation_date TEXT NOT NULL,
        unloading_tonnage REAL NOT NULL DEFAULT 0 CHECK (unloading_tonnage >= 0),
        loading_tonnage REAL NOT NULL DEFAULT 0 CHECK (loading_tonnage >= 0),
        remarks TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_operations_user_date
        ON ship_operations(user_id, operation_date)",
];

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to initialize schema")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let pool = open_in_memory().await.unwrap();
        init_schema(&pool).await.unwrap();

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(count.0 >= 5);
    }
}
