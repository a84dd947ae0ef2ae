//! Report generation engine
//!
//! Reads stored operation records and renders them back into the rigidly
//! positioned two-category production layout: one worksheet per requested
//! year, plus a multi-year comparison sheet when more than one year is
//! requested.

pub mod comparison;
pub mod format;
pub mod grid;
pub mod layout;
pub mod period;
pub mod summary;
pub mod writer;

use anyhow::Result;
use sqlx::SqlitePool;

use self::grid::{Grid, LayoutPositions};
use self::period::Granularity;
use crate::model::CargoCategory;
use crate::storage::repository::operations::OperationFilters;

/// Earliest year an export may request
pub const MIN_EXPORT_YEAR: i32 = 2020;

/// Caller-supplied filter set. `search` is carried through from the UI but
/// not applied by the engine itself.
#[derive(Debug, Clone, Default)]
pub struct ExportFilters {
    pub cargo_category: Option<CargoCategory>,
    pub shipping_line: Option<i64>,
    pub search: Option<String>,
}

impl ExportFilters {
    fn operation_filters(&self) -> OperationFilters {
        OperationFilters {
            cargo_category: self.cargo_category,
            shipping_line: self.shipping_line,
        }
    }
}

/// One built worksheet: display grid plus the styling side-channel
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    pub grid: Grid,
    pub positions: LayoutPositions,
}

/// Parse a comma-separated year list; junk entries are dropped
pub fn parse_years(input: &str) -> Vec<i32> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

/// Clamp to the acceptable range, deduplicate and sort ascending; an empty
/// result silently becomes the current year.
pub fn validate_years(input: &[i32], current_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = input
        .iter()
        .copied()
        .filter(|year| (MIN_EXPORT_YEAR..=current_year + 1).contains(year))
        .collect();
    years.sort_unstable();
    years.dedup();
    if years.is_empty() {
        years.push(current_year);
    }
    years
}

/// Report filename: granularity label plus the year or year range
pub fn export_filename(granularity: Granularity, years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if years.len() > 1 => format!(
            "Laporan Produksi {} {}-{}.xlsx",
            granularity.label(),
            first,
            last
        ),
        (Some(first), _) => format!("Laporan Produksi {} {}.xlsx", granularity.label(), first),
        _ => format!("Laporan Produksi {}.xlsx", granularity.label()),
    }
}

/// Build one worksheet per year, plus the trailing comparison sheet when
/// more than one year is requested.
pub async fn build_report(
    pool: &SqlitePool,
    user_id: i64,
    filters: &ExportFilters,
    granularity: Granularity,
    years: &[i32],
) -> Result<Vec<SheetData>> {
    let mut sheets = Vec::with_capacity(years.len() + 1);
    for &year in years {
        sheets.push(layout::build_year_sheet(pool, user_id, filters, granularity, year).await?);
        log::info!("Built production sheet for {}", year);
    }
    if years.len() > 1 {
        sheets.push(comparison::build_comparison_sheet(pool, user_id, years).await?);
        log::info!("Built multi-year comparison sheet for {:?}", years);
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_are_clamped_deduped_and_sorted() {
        assert_eq!(
            validate_years(&[2024, 2019, 2023, 2024, 2150], 2026),
            vec![2023, 2024]
        );
        // Next year is still acceptable
        assert_eq!(validate_years(&[2027], 2026), vec![2027]);
        assert_eq!(validate_years(&[2028], 2026), vec![2026]);
    }

    #[test]
    fn invalid_years_default_to_current() {
        assert_eq!(validate_years(&[], 2026), vec![2026]);
        assert_eq!(validate_years(&[1999], 2026), vec![2026]);
    }

    #[test]
    fn year_list_parsing_drops_junk() {
        assert_eq!(parse_years("2023,2024"), vec![2023, 2024]);
        assert_eq!(parse_years(" 2023 , x, 2024 "), vec![2023, 2024]);
        assert_eq!(parse_years(""), Vec::<i32>::new());
    }

    #[test]
    fn filenames_encode_granularity_and_years() {
        assert_eq!(
            export_filename(Granularity::Monthly, &[2024]),
            "Laporan Produksi Bulanan 2024.xlsx"
        );
        assert_eq!(
            export_filename(Granularity::Quarterly, &[2022, 2023, 2024]),
            "Laporan Produksi Triwulan 2022-2024.xlsx"
        );
        assert_eq!(
            export_filename(Granularity::SemiAnnual, &[2024]),
            "Laporan Produksi Semester 2024.xlsx"
        );
    }

    #[tokio::test]
    async fn multi_year_report_appends_comparison_sheet() {
        let pool = crate::storage::open_in_memory().await.unwrap();
        let filters = ExportFilters::default();

        let single = build_report(&pool, 1, &filters, Granularity::Monthly, &[2024])
            .await
            .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].name, "Produksi 2024");

        let multi = build_report(&pool, 1, &filters, Granularity::Monthly, &[2023, 2024])
            .await
            .unwrap();
        assert_eq!(multi.len(), 3);
        assert_eq!(multi[2].name, "Ringkasan Multi-Tahun");
    }
}
