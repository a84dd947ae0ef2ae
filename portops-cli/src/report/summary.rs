//! Yearly aggregation and derived "most X" facts

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use sqlx::SqlitePool;

use super::period::year_span;
use crate::model::{CargoCategory, OperationRow};
use crate::storage::repository::operations;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlySummary {
    pub year: i32,
    /// Distinct ships with at least one operation in the year
    pub total_ships: usize,
    pub total_unloading: f64,
    pub total_loading: f64,
    pub gc_unloading: f64,
    pub gc_loading: f64,
    pub container_unloading: f64,
    pub container_loading: f64,
    /// Ship with the highest combined tonnage
    pub top_ship: Option<(String, f64)>,
    /// Cargo name with the highest total unloading
    pub top_unloading_cargo: Option<(String, f64)>,
    /// Cargo name with the highest total loading
    pub top_loading_cargo: Option<(String, f64)>,
    /// Shipping line with the most operation records
    pub top_line: Option<(String, usize)>,
}

impl YearlySummary {
    pub fn total_tonnage(&self) -> f64 {
        self.total_unloading + self.total_loading
    }
}

/// Aggregate one user's full year of operations
pub async fn yearly_summary(pool: &SqlitePool, user_id: i64, year: i32) -> Result<YearlySummary> {
    let (start, end) = year_span(year)?;
    let rows = operations::rows_for_span(pool, user_id, start, end).await?;
    Ok(summarize(year, &rows))
}

/// Pure aggregation over rows in insertion order. Grouping preserves
/// first-encountered order; a later key only wins with a strictly greater
/// total, so ties keep the earliest-encountered key.
pub fn summarize(year: i32, rows: &[OperationRow]) -> YearlySummary {
    let mut summary = YearlySummary {
        year,
        ..YearlySummary::default()
    };

    let mut ships: HashSet<i64> = HashSet::new();
    for row in rows {
        ships.insert(row.ship_id);
        summary.total_unloading += row.unloading_tonnage;
        summary.total_loading += row.loading_tonnage;
        match row.category {
            CargoCategory::Gc => {
                summary.gc_unloading += row.unloading_tonnage;
                summary.gc_loading += row.loading_tonnage;
            }
            CargoCategory::Container => {
                summary.container_unloading += row.unloading_tonnage;
                summary.container_loading += row.loading_tonnage;
            }
        }
    }
    summary.total_ships = ships.len();

    summary.top_ship = max_grouped(rows, |row| (row.ship_name.clone(), row.total_tonnage()));
    summary.top_unloading_cargo =
        max_grouped(rows, |row| (row.cargo_name.clone(), row.unloading_tonnage));
    summary.top_loading_cargo =
        max_grouped(rows, |row| (row.cargo_name.clone(), row.loading_tonnage));
    summary.top_line =
        max_grouped(rows, |row| (row.shipping_line.clone(), 1.0)).map(|(name, count)| (name, count as usize));

    summary
}

/// Group rows by a key, sum the per-row values, and return the key with the
/// greatest total. First-encountered insertion order breaks ties.
fn max_grouped<F>(rows: &[OperationRow], key_value: F) -> Option<(String, f64)>
where
    F: Fn(&OperationRow) -> (String, f64),
{
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for row in rows {
        let (key, value) = key_value(row);
        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        *totals.entry(key).or_insert(0.0) += value;
    }

    let mut best: Option<(String, f64)> = None;
    for key in order {
        let total = totals[&key];
        match &best {
            Some((_, current)) if total <= *current => {}
            _ => best = Some((key, total)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(
        ship_id: i64,
        ship: &str,
        line: &str,
        cargo: &str,
        category: CargoCategory,
        unloading: f64,
        loading: f64,
    ) -> OperationRow {
        OperationRow {
            ship_id,
            ship_name: ship.to_string(),
            shipping_line: line.to_string(),
            country: "Indonesia".to_string(),
            cargo_name: cargo.to_string(),
            category,
            unloading_tonnage: unloading,
            loading_tonnage: loading,
            operation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn aggregates_totals_and_categories() {
        let rows = vec![
            row(1, "MV A", "Line A", "STEEL", CargoCategory::Gc, 100.0, 50.0),
            row(2, "MV B", "Line B", "CONTAINER", CargoCategory::Container, 200.0, 25.0),
            row(1, "MV A", "Line A", "COIL", CargoCategory::Gc, 10.0, 5.0),
        ];
        let summary = summarize(2024, &rows);

        assert_eq!(summary.total_ships, 2);
        assert_eq!(summary.total_unloading, 310.0);
        assert_eq!(summary.total_loading, 80.0);
        assert_eq!(summary.total_tonnage(), 390.0);
        assert_eq!(summary.gc_unloading, 110.0);
        assert_eq!(summary.container_unloading, 200.0);
    }

    #[test]
    fn derived_facts() {
        let rows = vec![
            row(1, "MV A", "Line A", "STEEL", CargoCategory::Gc, 100.0, 50.0),
            row(2, "MV B", "Line B", "COIL", CargoCategory::Gc, 200.0, 25.0),
            row(1, "MV A", "Line A", "STEEL", CargoCategory::Gc, 90.0, 0.0),
        ];
        let summary = summarize(2024, &rows);

        // MV A: 240 combined, MV B: 225
        assert_eq!(summary.top_ship, Some(("MV A".to_string(), 240.0)));
        // STEEL unloading 190, COIL 200
        assert_eq!(summary.top_unloading_cargo, Some(("COIL".to_string(), 200.0)));
        // STEEL loading 50, COIL 25
        assert_eq!(summary.top_loading_cargo, Some(("STEEL".to_string(), 50.0)));
        // Line A has 2 records
        assert_eq!(summary.top_line, Some(("Line A".to_string(), 2)));
    }

    #[test]
    fn ties_keep_the_first_encountered_key() {
        let rows = vec![
            row(1, "MV First", "Line A", "STEEL", CargoCategory::Gc, 100.0, 0.0),
            row(2, "MV Second", "Line B", "COIL", CargoCategory::Gc, 100.0, 0.0),
        ];
        let summary = summarize(2024, &rows);
        assert_eq!(summary.top_ship, Some(("MV First".to_string(), 100.0)));
        assert_eq!(summary.top_line, Some(("Line A".to_string(), 1)));
    }

    #[test]
    fn empty_year_is_all_zeros() {
        let summary = summarize(2024, &[]);
        assert_eq!(summary.total_ships, 0);
        assert_eq!(summary.total_tonnage(), 0.0);
        assert_eq!(summary.top_ship, None);
        assert_eq!(summary.top_line, None);
    }
}
