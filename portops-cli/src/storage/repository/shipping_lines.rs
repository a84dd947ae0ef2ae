//! Shipping line repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::model::{LineCategory, ShippingLine};

/// Find a shipping line by exact name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<ShippingLine>> {
    sqlx::query_as("SELECT id, name, category FROM shipping_lines WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to look up shipping line")
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    category: LineCategory,
) -> Result<ShippingLine> {
    let result = sqlx::query("INSERT INTO shipping_lines (name, category) VALUES (?, ?)")
        .bind(name)
        .bind(category)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert shipping line: {}", name))?;

    Ok(ShippingLine {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        category,
    })
}
