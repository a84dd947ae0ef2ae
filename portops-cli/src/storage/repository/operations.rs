//! Ship operation repository

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::model::{CargoCategory, OperationRow, ShipOperation};

/// Optional filters applied to the per-period block queries
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationFilters {
    pub cargo_category: Option<CargoCategory>,
    pub shipping_line: Option<i64>,
}

pub async fn insert(
    pool: &SqlitePool,
    user_id: i64,
    ship_id: i64,
    cargo_type_id: i64,
    operation_date: NaiveDate,
    unloading_tonnage: f64,
    loading_tonnage: f64,
    remarks: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO ship_operations
            (user_id, ship_id, cargo_type_id, operation_date,
             unloading_tonnage, loading_tonnage, remarks)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(ship_id)
    .bind(cargo_type_id)
    .bind(operation_date)
    .bind(unloading_tonnage)
    .bind(loading_tonnage)
    .bind(remarks)
    .execute(pool)
    .await
    .context("Failed to insert ship operation")?;

    Ok(result.last_insert_rowid())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ShipOperation>> {
    sqlx::query_as(
        "SELECT id, user_id, ship_id, cargo_type_id, operation_date,
                unloading_tonnage, loading_tonnage, remarks
         FROM ship_operations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to look up ship operation")
}

const ROW_SELECT: &str = "SELECT o.ship_id, s.name AS ship_name, sl.name AS shipping_line,
            c.name AS country, ct.name AS cargo_name, ct.category AS category,
            o.unloading_tonnage, o.loading_tonnage, o.operation_date
     FROM ship_operations o
     JOIN ships s ON s.id = o.ship_id
     JOIN shipping_lines sl ON sl.id = s.shipping_line_id
     JOIN countries c ON c.id = s.country_id
     JOIN cargo_types ct ON ct.id = o.cargo_type_id";

/// Rows of one grid block (by category) within a period span, newest first
pub async fn rows_for_period(
    pool: &SqlitePool,
    user_id: i64,
    category: CargoCategory,
    start: NaiveDate,
    end: NaiveDate,
    filters: OperationFilters,
) -> Result<Vec<OperationRow>> {
    let mut sql = format!(
        "{ROW_SELECT}
     WHERE o.user_id = ? AND ct.category = ? AND o.operation_date BETWEEN ? AND ?"
    );
    if filters.cargo_category.is_some() {
        sql.push_str(" AND ct.category = ?");
    }
    if filters.shipping_line.is_some() {
        sql.push_str(" AND s.shipping_line_id = ?");
    }
    sql.push_str(" ORDER BY o.operation_date DESC");

    let mut query = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(category)
        .bind(start)
        .bind(end);
    if let Some(filter_category) = filters.cargo_category {
        query = query.bind(filter_category);
    }
    if let Some(line_id) = filters.shipping_line {
        query = query.bind(line_id);
    }

    query
        .fetch_all(pool)
        .await
        .context("Failed to fetch operations for period")
}

/// All of a user's rows within a date span, in insertion order
pub async fn rows_for_span(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OperationRow>> {
    let sql = format!(
        "{ROW_SELECT}
     WHERE o.user_id = ? AND o.operation_date BETWEEN ? AND ?
     ORDER BY o.id"
    );
    sqlx::query_as(&sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
        .context("Failed to fetch operations for span")
}

/// Per-category tonnage sums over a period span (unfiltered; the totals row
/// of the grid is computed from these regardless of block filters)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodSums {
    pub gc_unloading: f64,
    pub gc_loading: f64,
    pub container_unloading: f64,
    pub container_loading: f64,
}

pub async fn period_sums(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PeriodSums> {
    let rows: Vec<(CargoCategory, f64, f64)> = sqlx::query_as(
        "SELECT ct.category,
                COALESCE(SUM(o.unloading_tonnage), 0),
                COALESCE(SUM(o.loading_tonnage), 0)
         FROM ship_operations o
         JOIN cargo_types ct ON ct.id = o.cargo_type_id
         WHERE o.user_id = ? AND o.operation_date BETWEEN ? AND ?
         GROUP BY ct.category",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("Failed to compute period sums")?;

    let mut sums = PeriodSums::default();
    for (category, unloading, loading) in rows {
        match category {
            CargoCategory::Gc => {
                sums.gc_unloading = unloading;
                sums.gc_loading = loading;
            }
            CargoCategory::Container => {
                sums.container_unloading = unloading;
                sums.container_loading = loading;
            }
        }
    }
    Ok(sums)
}

/// Tonnage sums per calendar month of one year, as a fixed 12-slot table
/// (slot 0 = January); months without records stay zero.
pub async fn monthly_totals(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<[(f64, f64); 12]> {
    let rows: Vec<(i64, f64, f64)> = sqlx::query_as(
        "SELECT CAST(strftime('%m', o.operation_date) AS INTEGER),
                COALESCE(SUM(o.unloading_tonnage), 0),
                COALESCE(SUM(o.loading_tonnage), 0)
         FROM ship_operations o
         WHERE o.user_id = ? AND o.operation_date BETWEEN ? AND ?
         GROUP BY 1",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("Failed to compute monthly totals")?;

    let mut totals = [(0.0, 0.0); 12];
    for (month, unloading, loading) in rows {
        if (1..=12).contains(&month) {
            totals[(month - 1) as usize] = (unloading, loading);
        }
    }
    Ok(totals)
}
