//! Country repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::model::Country;

/// Find a country by exact name, case-insensitively
pub async fn find_by_name_ci(pool: &SqlitePool, name: &str) -> Result<Option<Country>> {
    sqlx::query_as(
        "SELECT id, name, code, alpha3, flag_emoji FROM countries WHERE UPPER(name) = UPPER(?)",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to look up country by name")
}

/// All countries, in insertion order (used by the fuzzy matching fallback)
pub async fn all(pool: &SqlitePool) -> Result<Vec<Country>> {
    sqlx::query_as("SELECT id, name, code, alpha3, flag_emoji FROM countries ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list countries")
}

pub async fn code_exists(pool: &SqlitePool, code: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM countries WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await
        .context("Failed to check country code")?;
    Ok(row.is_some())
}

pub async fn alpha3_exists(pool: &SqlitePool, alpha3: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM countries WHERE alpha3 = ?")
        .bind(alpha3)
        .fetch_optional(pool)
        .await
        .context("Failed to check country alpha3 code")?;
    Ok(row.is_some())
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    code: &str,
    alpha3: &str,
    flag_emoji: &str,
) -> Result<Country> {
    let result = sqlx::query(
        "INSERT INTO countries (name, code, alpha3, flag_emoji) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(code)
    .bind(alpha3)
    .bind(flag_emoji)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to insert country: {}", name))?;

    Ok(Country {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        code: code.to_string(),
        alpha3: alpha3.to_string(),
        flag_emoji: flag_emoji.to_string(),
    })
}
