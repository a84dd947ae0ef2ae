//! Multi-year comparison sheet: per-year table, trend, analytics

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use sqlx::SqlitePool;

use super::format::{format_number_en, format_percent, format_tonnage, format_tonnage_or_zero};
use super::grid::{Cell, Grid, LayoutPositions, MergeRange, GRID_COLS};
use super::period::{year_span, ENGLISH_MONTHS_SHORT, INDONESIAN_MONTHS};
use super::summary::{yearly_summary, YearlySummary};
use super::SheetData;
use crate::storage::repository::operations;

/// Fixed utilization denominator: one million tons of capacity per year
const UTILIZATION_CAPACITY_PER_YEAR: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiYearAnalysis {
    pub average_ships: i64,
    pub average_unloading: f64,
    pub average_loading: f64,
    pub average_tonnage: f64,
    /// (last year - first year) / first year, in percent
    pub growth_rate: f64,
}

pub fn analyze(summaries: &[YearlySummary]) -> MultiYearAnalysis {
    let count = summaries.len().max(1) as f64;
    let total_ships: usize = summaries.iter().map(|s| s.total_ships).sum();
    let total_unloading: f64 = summaries.iter().map(|s| s.total_unloading).sum();
    let total_loading: f64 = summaries.iter().map(|s| s.total_loading).sum();
    let total_tonnage: f64 = summaries.iter().map(|s| s.total_tonnage()).sum();

    let growth_rate = match (summaries.first(), summaries.last()) {
        (Some(first), Some(last)) if summaries.len() > 1 && first.total_tonnage() != 0.0 => {
            let rate = (last.total_tonnage() - first.total_tonnage()) / first.total_tonnage()
                * 100.0;
            (rate * 100.0).round() / 100.0
        }
        _ => 0.0,
    };

    MultiYearAnalysis {
        average_ships: (total_ships as f64 / count).round() as i64,
        average_unloading: total_unloading / count,
        average_loading: total_loading / count,
        average_tonnage: total_tonnage / count,
        growth_rate,
    }
}

/// Qualitative indicators; meaningful only with at least two years
pub fn performance_indicators(summaries: &[YearlySummary]) -> Vec<(&'static str, String)> {
    if summaries.len() < 2 {
        return vec![
            ("Efisiensi Operasional", "N/A".to_string()),
            ("Tingkat Utilisasi", "N/A".to_string()),
            ("Konsistensi Produksi", "N/A".to_string()),
        ];
    }

    let years = summaries.len() as f64;
    let tonnages: Vec<f64> = summaries.iter().map(|s| s.total_tonnage()).collect();
    let total_tonnage: f64 = tonnages.iter().sum();
    let total_ships: usize = summaries.iter().map(|s| s.total_ships).sum();

    let tonnage_per_ship = if total_ships > 0 {
        total_tonnage / total_ships as f64
    } else {
        0.0
    };
    let utilization = total_tonnage / (years * UTILIZATION_CAPACITY_PER_YEAR) * 100.0;

    let mean = total_tonnage / years;
    let coefficient = if mean != 0.0 {
        standard_deviation(&tonnages) / mean
    } else {
        0.0
    };
    let consistency = if coefficient < 0.2 {
        "Tinggi"
    } else if coefficient < 0.5 {
        "Sedang"
    } else {
        "Rendah"
    };

    vec![
        (
            "Efisiensi Operasional",
            format!("{} ton/kapal", format_tonnage(tonnage_per_ship)),
        ),
        (
            "Tingkat Utilisasi",
            format!("{}%", format_number_en(utilization)),
        ),
        ("Konsistensi Produksi", consistency.to_string()),
    ]
}

fn standard_deviation(values: &[f64]) -> f64 {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    variance.sqrt()
}

/// 12 monthly (unloading, loading) buckets averaged across the given years
pub async fn monthly_trend(
    pool: &SqlitePool,
    user_id: i64,
    years: &[i32],
) -> Result<[(f64, f64); 12]> {
    let mut trend = [(0.0, 0.0); 12];
    for &year in years {
        let (start, end) = year_span(year)?;
        let totals = operations::monthly_totals(pool, user_id, start, end).await?;
        for (slot, (unloading, loading)) in totals.iter().enumerate() {
            trend[slot].0 += unloading;
            trend[slot].1 += loading;
        }
    }
    let count = years.len().max(1) as f64;
    for slot in trend.iter_mut() {
        slot.0 /= count;
        slot.1 /= count;
    }
    Ok(trend)
}

pub async fn build_comparison_sheet(
    pool: &SqlitePool,
    user_id: i64,
    years: &[i32],
) -> Result<SheetData> {
    let mut summaries = Vec::with_capacity(years.len());
    for &year in years {
        summaries.push(yearly_summary(pool, user_id, year).await?);
    }
    let trend = monthly_trend(pool, user_id, years).await?;
    let analysis = analyze(&summaries);
    let indicators = performance_indicators(&summaries);

    let mut grid = Grid::default();
    let mut positions = LayoutPositions::default();

    let year_list = years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    push_section_header(
        &mut grid,
        &mut positions,
        &format!("RINGKASAN PRODUKSI TAHUN {}", year_list),
    );
    grid.push_blank();

    // Per-year comparison table
    push_section_header(&mut grid, &mut positions, "PERBANDINGAN PER TAHUN");
    let mut row = vec![Cell::Empty; GRID_COLS];
    for (col, header) in [
        "Tahun",
        "Total Kapal",
        "Total Bongkar",
        "Total Muat",
        "Total Keseluruhan",
    ]
    .iter()
    .enumerate()
    {
        row[col] = Cell::text(*header);
    }
    grid.push(row);

    let table_start = grid.next_row();
    for summary in &summaries {
        let mut row = vec![Cell::Empty; GRID_COLS];
        row[0] = Cell::Number(summary.year as f64);
        row[1] = Cell::Number(summary.total_ships as f64);
        row[2] = Cell::text(format_tonnage_or_zero(summary.total_unloading));
        row[3] = Cell::text(format_tonnage_or_zero(summary.total_loading));
        row[4] = Cell::text(format_tonnage_or_zero(summary.total_tonnage()));
        grid.push(row);
    }
    positions
        .data_row_ranges
        .push((table_start, grid.next_row() - 1));
    grid.push_blank();

    // Monthly trend averaged across years
    push_section_header(&mut grid, &mut positions, "TREND PERTUMBUHAN");
    let mut row = vec![Cell::Empty; GRID_COLS];
    for (col, header) in ["Bulan", "Bongkar", "Muat", "Total"].iter().enumerate() {
        row[col] = Cell::text(*header);
    }
    grid.push(row);

    let trend_start = grid.next_row();
    for (slot, (unloading, loading)) in trend.iter().enumerate() {
        let mut row = vec![Cell::Empty; GRID_COLS];
        row[0] = Cell::text(ENGLISH_MONTHS_SHORT[slot]);
        row[1] = Cell::text(format_tonnage_or_zero(*unloading));
        row[2] = Cell::text(format_tonnage_or_zero(*loading));
        row[3] = Cell::text(format_tonnage_or_zero(unloading + loading));
        grid.push(row);
    }
    positions
        .data_row_ranges
        .push((trend_start, grid.next_row() - 1));
    grid.push_blank();

    // Multi-year analysis
    push_section_header(&mut grid, &mut positions, "ANALISIS MULTI-TAHUN");
    grid.push(label_value(
        "Rata-rata Kapal/Tahun:",
        Cell::Number(analysis.average_ships as f64),
    ));
    grid.push(label_value(
        "Rata-rata Bongkar/Tahun:",
        Cell::text(format_tonnage(analysis.average_unloading)),
    ));
    grid.push(label_value(
        "Pertumbuhan Tahunan:",
        Cell::text(format!("{}%", format_percent(analysis.growth_rate))),
    ));
    grid.push_blank();

    // Performance indicators
    push_section_header(&mut grid, &mut positions, "INDIKATOR KINERJA");
    for (label, value) in indicators {
        grid.push(label_value(&format!("{}:", label), Cell::text(value)));
    }

    push_signature_block(&mut grid, Local::now().date_naive());

    Ok(SheetData {
        name: "Ringkasan Multi-Tahun".to_string(),
        grid,
        positions,
    })
}

fn push_section_header(grid: &mut Grid, positions: &mut LayoutPositions, title: &str) {
    let header_row = grid.next_row();
    positions.period_header_rows.push(header_row);
    positions
        .merge_ranges
        .push(MergeRange::row(header_row, 0, (GRID_COLS - 1) as u16));
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(title);
    grid.push(row);
}

fn label_value(label: &str, value: Cell) -> Vec<Cell> {
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[0] = Cell::text(label);
    row[1] = value;
    row
}

/// Signature area in column M, dated with the Indonesian month name
fn push_signature_block(grid: &mut Grid, today: NaiveDate) {
    let date_line = format!(
        "Merak, {} {} {}",
        today.day(),
        INDONESIAN_MONTHS[(today.month() - 1) as usize],
        today.year()
    );

    grid.push_blank();
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[12] = Cell::text(date_line);
    grid.push(row);
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[12] = Cell::text("Penanggung Jawab,");
    grid.push(row);
    grid.push_blank();
    grid.push_blank();
    grid.push_blank();
    let mut row = vec![Cell::Empty; GRID_COLS];
    row[12] = Cell::text("(_________________)");
    grid.push(row);
}
