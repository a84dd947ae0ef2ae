//! Ship repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::model::Ship;

/// Find a ship by exact name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Ship>> {
    sqlx::query_as("SELECT id, name, country_id, shipping_line_id FROM ships WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to look up ship")
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    country_id: i64,
    shipping_line_id: i64,
) -> Result<Ship> {
    let result =
        sqlx::query("INSERT INTO ships (name, country_id, shipping_line_id) VALUES (?, ?, ?)")
            .bind(name)
            .bind(country_id)
            .bind(shipping_line_id)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to insert ship: {}", name))?;

    Ok(Ship {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        country_id,
        shipping_line_id,
    })
}
