//! Single-year production sheet: layout and aggregation
//!
//! Periods are rendered in ascending order; a period with no records (or
//! only zero tonnage) in both blocks is omitted entirely. Row positions are
//! tracked as a pure side output for the downstream styling pass.

use anyhow::Result;
use sqlx::SqlitePool;

use super::format::{format_tonnage, format_tonnage_or_blank, format_tonnage_or_zero};
use super::grid::{Cell, Grid, LayoutPositions, MergeRange, GRID_COLS};
use super::period::{period_ranges, Granularity};
use super::summary::{yearly_summary, YearlySummary};
use super::{ExportFilters, SheetData};
use crate::model::{CargoCategory, OperationRow};
use crate::storage::repository::operations;

pub const COLUMN_HEADERS: [&str; 7] = [
    "NO",
    "NAMA KAPAL",
    "LINE",
    "BENDERA",
    "CARGO",
    "T/BONGKAR",
    "T/MUAT",
];

pub async fn build_year_sheet(
    pool: &SqlitePool,
    user_id: i64,
    filters: &ExportFilters,
    granularity: Granularity,
    year: i32,
) -> Result<SheetData> {
    let mut grid = Grid::default();
    let mut positions = LayoutPositions::default();

    // Title matches the import classifier's acceptance fragments, so a
    // generated sheet survives a round trip through the pipeline
    let title_row = grid.next_row();
    positions
        .merge_ranges
        .push(MergeRange::row(title_row, 0, (GRID_COLS - 1) as u16));
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(format!("DATA PRODUKSI TAHUN {} IKPP MERAK", year));
    grid.push(row);
    grid.push_blank();

    // Category header
    let category_row = grid.next_row();
    positions
        .merge_ranges
        .push(MergeRange::row(category_row, 0, 6));
    positions
        .merge_ranges
        .push(MergeRange::row(category_row, 8, 14));
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(CargoCategory::Gc.as_str());
    row[8] = Cell::text(CargoCategory::Container.as_str());
    grid.push(row);

    // Column headers for both blocks
    let mut row = vec![Cell::Empty; GRID_COLS];
    for (offset, header) in COLUMN_HEADERS.iter().enumerate() {
        row[offset] = Cell::text(*header);
        row[offset + 8] = Cell::text(*header);
    }
    grid.push(row);

    let op_filters = filters.operation_filters();
    for span in period_ranges(year, granularity)? {
        let gc = operations::rows_for_period(
            pool,
            user_id,
            CargoCategory::Gc,
            span.start,
            span.end,
            op_filters,
        )
        .await?;
        let container = operations::rows_for_period(
            pool,
            user_id,
            CargoCategory::Container,
            span.start,
            span.end,
            op_filters,
        )
        .await?;

        // Empty periods do not appear in the output
        if gc.is_empty() && container.is_empty() {
            continue;
        }
        if block_tonnage(&gc) == 0.0 && block_tonnage(&container) == 0.0 {
            continue;
        }

        let sums = operations::period_sums(pool, user_id, span.start, span.end).await?;

        let header_row = grid.next_row();
        positions.period_header_rows.push(header_row);
        positions
            .merge_ranges
            .push(MergeRange::row(header_row, 0, 6));
        positions
            .merge_ranges
            .push(MergeRange::row(header_row, 8, 14));
        let mut row = vec![Cell::Empty; GRID_COLS];
        row[0] = Cell::text(span.label.clone());
        row[8] = Cell::text(span.label.clone());
        grid.push(row);

        let data_start = grid.next_row();
        let max_rows = gc.len().max(container.len());
        for index in 0..max_rows {
            let mut row = vec![Cell::Empty; GRID_COLS];
            if let Some(op) = gc.get(index) {
                fill_block(&mut row, 0, index, op);
            }
            if let Some(op) = container.get(index) {
                fill_block(&mut row, 8, index, op);
            }
            grid.push(row);
        }

        let total_row = grid.next_row();
        positions.total_rows.push(total_row);
        let mut row = vec![Cell::Empty; GRID_COLS];
        row[0] = Cell::text("TOTAL");
        row[2] = Cell::Number(gc.len() as f64);
        row[5] = Cell::text(format_tonnage_or_blank(sums.gc_unloading));
        row[6] = Cell::text(format_tonnage_or_blank(sums.gc_loading));
        row[8] = Cell::text("TOTAL");
        row[10] = Cell::Number(container.len() as f64);
        row[13] = Cell::text(format_tonnage_or_blank(sums.container_unloading));
        row[14] = Cell::text(format_tonnage_or_blank(sums.container_loading));
        grid.push(row);

        // Range spans the data rows through the totals row
        positions.data_row_ranges.push((data_start, total_row));

        grid.push_blank();
    }

    let summary = yearly_summary(pool, user_id, year).await?;
    push_summary_block(&mut grid, &mut positions, &summary);

    Ok(SheetData {
        name: format!("Produksi {}", year),
        grid,
        positions,
    })
}

fn block_tonnage(rows: &[OperationRow]) -> f64 {
    rows.iter().map(|row| row.total_tonnage()).sum()
}

fn fill_block(row: &mut [Cell], start: usize, index: usize, op: &OperationRow) {
    row[start] = Cell::Number((index + 1) as f64);
    row[start + 1] = Cell::text(op.ship_name.clone());
    row[start + 2] = Cell::text(op.shipping_line.clone());
    row[start + 3] = Cell::text(op.country.clone());
    row[start + 4] = Cell::text(op.cargo_name.clone());
    row[start + 5] = Cell::text(format_tonnage_or_blank(op.unloading_tonnage));
    row[start + 6] = Cell::text(format_tonnage_or_blank(op.loading_tonnage));
}

fn push_summary_block(grid: &mut Grid, positions: &mut LayoutPositions, summary: &YearlySummary) {
    let header_row = grid.next_row();
    positions.summary_header_row = Some(header_row);
    positions
        .merge_ranges
        .push(MergeRange::row(header_row, 0, (GRID_COLS - 1) as u16));
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(format!("RINGKASAN TAHUN {}", summary.year));
    grid.push(row);

    grid.push(label_value("Total Kapal:", Cell::Number(summary.total_ships as f64)));
    grid.push(label_value(
        "Total Bongkar:",
        Cell::text(format_tonnage_or_zero(summary.total_unloading)),
    ));
    grid.push(label_value(
        "Total Muat:",
        Cell::text(format_tonnage_or_zero(summary.total_loading)),
    ));
    grid.push(label_value(
        "Total Keseluruhan:",
        Cell::text(format_tonnage_or_zero(summary.total_tonnage())),
    ));
    grid.push(label_value(
        "GC - Bongkar:",
        Cell::text(format_tonnage_or_zero(summary.gc_unloading)),
    ));
    grid.push(label_value(
        "GC - Muat:",
        Cell::text(format_tonnage_or_zero(summary.gc_loading)),
    ));
    grid.push(label_value(
        "CONTAINER - Bongkar:",
        Cell::text(format_tonnage_or_zero(summary.container_unloading)),
    ));
    grid.push(label_value(
        "CONTAINER - Muat:",
        Cell::text(format_tonnage_or_zero(summary.container_loading)),
    ));

    let top_ship = summary
        .top_ship
        .as_ref()
        .map(|(name, tonnage)| format!("{} ({} ton)", name, format_tonnage(*tonnage)))
        .unwrap_or_else(|| "-".to_string());
    grid.push(label_value("Kapal Terproduktif:", Cell::text(top_ship)));

    let top_unloading = summary
        .top_unloading_cargo
        .as_ref()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "-".to_string());
    grid.push(label_value("Cargo Bongkar Terbanyak:", Cell::text(top_unloading)));

    let top_loading = summary
        .top_loading_cargo
        .as_ref()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "-".to_string());
    grid.push(label_value("Cargo Muat Terbanyak:", Cell::text(top_loading)));

    let top_line = summary
        .top_line
        .as_ref()
        .map(|(name, count)| format!("{} ({} operasi)", name, count))
        .unwrap_or_else(|| "-".to_string());
    grid.push(label_value("Line Teraktif:", Cell::text(top_line)));
}

fn label_value(label: &str, value: Cell) -> Vec<Cell> {
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(label);
    row[1] = value;
    row
}
