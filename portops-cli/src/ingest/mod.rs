//! Spreadsheet ingestion pipeline
//!
//! Recovers operation records from loosely formatted production sheets. A
//! sheet with the wrong layout is skipped without side effects; a malformed
//! row is logged and dropped without aborting the sheet; previously imported
//! rows are never rolled back. Re-importing the same sheet duplicates
//! records by design.

pub mod classify;
pub mod extract;
pub mod grid;
pub mod resolve;

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use sqlx::SqlitePool;

use self::classify::{RowKind, ScanState};
use self::grid::Block;

/// Only the first five worksheets are ever processed
const MAX_SHEETS: usize = 5;

/// Upload size limit, matching the web tier's 2048 KB cap
const MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub sheets_seen: usize,
    pub sheets_processed: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SheetOutcome {
    pub processed: bool,
    pub imported: usize,
    pub skipped: usize,
}

/// Import every accepted worksheet of the workbook at `path`, recording the
/// created operations under `user_id`.
pub async fn import_workbook(
    pool: &SqlitePool,
    path: &Path,
    user_id: i64,
) -> Result<ImportOutcome> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx") | Some("xls") => {}
        _ => bail!("Only .xlsx and .xls files can be imported: {}", path.display()),
    }

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if metadata.len() > MAX_FILE_BYTES {
        bail!(
            "File exceeds the {} KB import limit: {}",
            MAX_FILE_BYTES / 1024,
            path.display()
        );
    }

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    log::info!("Importing {} ({} sheets)", path.display(), sheet_names.len());

    let mut outcome = ImportOutcome::default();
    for (index, name) in sheet_names.iter().enumerate() {
        if index >= MAX_SHEETS {
            log::info!("Unknown sheet skipped: {}", name);
            continue;
        }
        outcome.sheets_seen += 1;

        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(err) => {
                log::error!("Failed to read sheet {}: {}", name, err);
                continue;
            }
        };
        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();

        let sheet = process_sheet(pool, user_id, name, &rows).await;
        if sheet.processed {
            outcome.sheets_processed += 1;
        }
        outcome.rows_imported += sheet.imported;
        outcome.rows_skipped += sheet.skipped;
    }

    log::info!(
        "Import complete: {} rows imported, {} skipped across {} sheets",
        outcome.rows_imported,
        outcome.rows_skipped,
        outcome.sheets_processed
    );
    Ok(outcome)
}

/// Classify and process the rows of one worksheet. Row failures are isolated;
/// this never aborts the sheet.
pub async fn process_sheet(
    pool: &SqlitePool,
    user_id: i64,
    sheet_name: &str,
    rows: &[Vec<Data>],
) -> SheetOutcome {
    let mut outcome = SheetOutcome::default();

    log::info!("Processing sheet '{}' with {} rows", sheet_name, rows.len());
    if rows.is_empty() {
        log::info!("Sheet '{}' is empty, skipping", sheet_name);
        return outcome;
    }

    if !classify::accept_sheet(rows) {
        log::info!("Sheet '{}' doesn't match criteria, skipping", sheet_name);
        return outcome;
    }
    outcome.processed = true;

    let mut state = ScanState::default();
    for (index, row) in rows.iter().enumerate() {
        match classify::classify_row(row) {
            RowKind::Blank => log::debug!("Row {}: empty, skipping", index),
            RowKind::Total => log::debug!("Row {}: totals row, skipping", index),
            RowKind::ColumnHeader => log::debug!("Row {}: column header, skipping", index),
            RowKind::PeriodHeader => {
                for block in Block::ALL {
                    if let Some(period) = classify::extract_period(row, block) {
                        log::info!(
                            "Row {}: {:?} block now at {}/{}",
                            index,
                            block,
                            period.month,
                            period.year
                        );
                        state.set(block, period);
                    }
                }
            }
            RowKind::Data => {
                for block in Block::ALL {
                    let Some(period) = state.get(block) else {
                        continue;
                    };
                    if !classify::is_data_row(row, block) {
                        continue;
                    }

                    match extract::extract_operation(row, block, period) {
                        Some(op) => {
                            match resolve::create_operation(pool, user_id, &op).await {
                                Ok(id) => {
                                    log::info!(
                                        "Row {}: created {} operation {} for {}",
                                        index,
                                        op.category.as_str(),
                                        id,
                                        op.ship_name
                                    );
                                    outcome.imported += 1;
                                }
                                Err(err) => {
                                    log::error!(
                                        "Row {}: error processing {:?} block ({}): {:#}",
                                        index,
                                        block,
                                        op.ship_name,
                                        err
                                    );
                                    log::error!("Row data: {}", row_context(row));
                                    outcome.skipped += 1;
                                }
                            }
                        }
                        None => outcome.skipped += 1,
                    }
                }
            }
        }
    }

    log::info!(
        "Sheet '{}' complete: {} imported, {} skipped",
        sheet_name,
        outcome.imported,
        outcome.skipped
    );
    outcome
}

/// Row cells as a JSON array for error logs
fn row_context(row: &[Data]) -> String {
    let cells: Vec<String> = (0..row.len()).map(|col| grid::cell_text(row, col)).collect();
    serde_json::to_string(&cells).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CargoCategory, OperationRow};
    use crate::storage;
    use crate::storage::repository::operations;
    use chrono::NaiveDate;

    fn text_row(cells: &[&str]) -> Vec<Data> {
        cells.iter().map(|c| Data::String((*c).to_string())).collect()
    }

    fn production_sheet() -> Vec<Vec<Data>> {
        vec![
            text_row(&["DATA PRODUKSI TAHUN 2024 IKPP MERAK"]),
            text_row(&[]),
            text_row(&[
                "JANUARI 2024", "", "", "", "", "", "", "", "JANUARI 2024",
            ]),
            text_row(&[
                "NO", "NAMA KAPAL", "LINE", "BENDERA", "CARGO", "T/BONGKAR", "T/MUAT", "", "NO",
                "NAMA KAPAL", "LINE", "BENDERA", "CARGO", "T/BONGKAR", "T/MUAT",
            ]),
            text_row(&["1", "MV Test", "Line A", "Indonesia", "STEEL", "100,5", "200,25"]),
        ]
    }

    async fn all_rows(pool: &sqlx::SqlitePool) -> Vec<OperationRow> {
        operations::rows_for_span(
            pool,
            1,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2100, 12, 31).unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn imports_a_gc_data_row() {
        let pool = storage::open_in_memory().await.unwrap();

        let outcome = process_sheet(&pool, 1, "Sheet1", &production_sheet()).await;
        assert!(outcome.processed);
        assert_eq!(outcome.imported, 1);

        let rows = all_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.ship_name, "MV Test");
        assert_eq!(row.unloading_tonnage, 100.5);
        assert_eq!(row.loading_tonnage, 200.25);
        assert_eq!(
            row.operation_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(row.category, CargoCategory::Gc);

        let stored = operations::find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(stored.remarks.as_deref(), Some("Imported from Excel - GC"));
        assert_eq!(stored.total_tonnage(), 300.75);
    }

    #[tokio::test]
    async fn imports_a_container_summary_row() {
        let pool = storage::open_in_memory().await.unwrap();

        let mut sheet = production_sheet();
        let mut cells = vec![""; 15];
        cells[9] = "KAPAL";
        cells[13] = "500";
        sheet.push(text_row(&cells));

        let outcome = process_sheet(&pool, 1, "Sheet1", &sheet).await;
        assert_eq!(outcome.imported, 2);

        let rows = all_rows(&pool).await;
        let summary = rows
            .iter()
            .find(|r| r.ship_name == "Container Summary 1/2024")
            .unwrap();
        assert_eq!(summary.cargo_name, "CONTAINER");
        assert_eq!(summary.category, CargoCategory::Container);
    }

    #[tokio::test]
    async fn wrong_sheet_has_no_side_effects() {
        let pool = storage::open_in_memory().await.unwrap();

        let sheet = vec![
            text_row(&["QUARTERLY SALES"]),
            text_row(&["JANUARI 2024"]),
            text_row(&["1", "MV Test", "Line A", "Indonesia", "STEEL", "100", "200"]),
        ];
        let outcome = process_sheet(&pool, 1, "Sheet1", &sheet).await;
        assert!(!outcome.processed);
        assert_eq!(outcome.imported, 0);
        assert!(all_rows(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn state_carries_across_blank_and_total_rows() {
        let pool = storage::open_in_memory().await.unwrap();

        let mut sheet = production_sheet();
        sheet.push(text_row(&[]));
        sheet.push(text_row(&["TOTAL", "", "1", "", "", "100,5", "200,25"]));
        sheet.push(text_row(&["2", "MV Second", "Line A", "Indonesia", "COIL", "50", "60"]));

        let outcome = process_sheet(&pool, 1, "Sheet1", &sheet).await;
        assert_eq!(outcome.imported, 2);

        let rows = all_rows(&pool).await;
        let second = rows.iter().find(|r| r.ship_name == "MV Second").unwrap();
        assert_eq!(
            second.operation_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn data_before_any_period_header_is_ignored() {
        let pool = storage::open_in_memory().await.unwrap();

        let sheet = vec![
            text_row(&["DATA PRODUKSI TAHUN 2024 IKPP MERAK"]),
            text_row(&["1", "MV Early", "Line A", "Indonesia", "STEEL", "100", "200"]),
        ];
        let outcome = process_sheet(&pool, 1, "Sheet1", &sheet).await;
        assert!(outcome.processed);
        assert_eq!(outcome.imported, 0);
    }

    #[tokio::test]
    async fn reimport_duplicates_records() {
        let pool = storage::open_in_memory().await.unwrap();

        process_sheet(&pool, 1, "Sheet1", &production_sheet()).await;
        process_sheet(&pool, 1, "Sheet1", &production_sheet()).await;

        let rows = all_rows(&pool).await;
        assert_eq!(rows.len(), 2);
    }
}
