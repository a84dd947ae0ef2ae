//! Cargo type repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::model::{CargoCategory, CargoType};

/// Find a cargo type by exact name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<CargoType>> {
    sqlx::query_as("SELECT id, name, category FROM cargo_types WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to look up cargo type")
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    category: CargoCategory,
) -> Result<CargoType> {
    let result = sqlx::query("INSERT INTO cargo_types (name, category) VALUES (?, ?)")
        .bind(name)
        .bind(category)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert cargo type: {}", name))?;

    Ok(CargoType {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        category,
    })
}
