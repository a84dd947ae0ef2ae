//! Sheet acceptance and row classification
//!
//! The source grid has no declared schema; month headers, data rows and
//! totals are only recoverable through ordered, stateful heuristics. Each
//! block carries its own month/year state, advanced only by a successful
//! header match and never cleared by unrelated rows.

use calamine::Data;
use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use super::grid::{cell_text, is_numeric, row_is_blank, Block};

/// Both fragments must appear in some row for a sheet to be accepted
pub const TITLE_FRAGMENT: &str = "DATA PRODUKSI TAHUN";
pub const SITE_FRAGMENT: &str = "IKPP MERAK";

/// Leading-cell values that can never be a ship name
pub const RESERVED_NAMES: [&str; 3] = ["NO", "NAMA KAPAL", "TOTAL"];

/// Month names recognized in period headers, checked in order (full
/// Indonesian names before the shared 3-letter abbreviations).
static MONTHS: &[(&str, u32)] = &[
    ("JANUARI", 1),
    ("FEBRUARI", 2),
    ("MARET", 3),
    ("APRIL", 4),
    ("MEI", 5),
    ("JUNI", 6),
    ("JULI", 7),
    ("AGUSTUS", 8),
    ("SEPTEMBER", 9),
    ("OKTOBER", 10),
    ("NOVEMBER", 11),
    ("DESEMBER", 12),
    ("JAN", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("APR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AUG", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DEC", 12),
];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").expect("valid year regex"));

/// Month/year carried state for one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

/// Independent carried state for the two blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanState {
    left: Option<Period>,
    right: Option<Period>,
}

impl ScanState {
    pub fn get(&self, block: Block) -> Option<Period> {
        match block {
            Block::Left => self.left,
            Block::Right => self.right,
        }
    }

    pub fn set(&mut self, block: Block, period: Period) {
        match block {
            Block::Left => self.left = Some(period),
            Block::Right => self.right = Some(period),
        }
    }
}

/// Classification of one row of an accepted sheet. Total and mutually
/// exclusive: every row maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Blank,
    Total,
    PeriodHeader,
    ColumnHeader,
    Data,
}

/// A sheet is accepted when some row's concatenated text carries both the
/// report title fragment and the site identifier.
pub fn accept_sheet(rows: &[Vec<Data>]) -> bool {
    rows.iter().any(|row| {
        let text = (0..row.len())
            .map(|col| cell_text(row, col))
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        text.contains(TITLE_FRAGMENT) && text.contains(SITE_FRAGMENT)
    })
}

pub fn classify_row(row: &[Data]) -> RowKind {
    if row_is_blank(row) {
        return RowKind::Blank;
    }
    if is_total_row(row) {
        return RowKind::Total;
    }
    if extract_period(row, Block::Left).is_some() || extract_period(row, Block::Right).is_some() {
        return RowKind::PeriodHeader;
    }
    if is_column_header_row(row) {
        return RowKind::ColumnHeader;
    }
    RowKind::Data
}

fn is_total_row(row: &[Data]) -> bool {
    Block::ALL
        .iter()
        .any(|block| cell_text(row, block.id_col()).eq_ignore_ascii_case("TOTAL"))
}

fn is_column_header_row(row: &[Data]) -> bool {
    Block::ALL.iter().any(|block| {
        let cell = cell_text(row, block.id_col()).to_uppercase();
        cell == "NO" || cell.contains("NAMA KAPAL")
    })
}

/// Look for a month name (plus an optional 4-digit year) in the leading cell
/// of one block; a missing year falls back to the current year.
pub fn extract_period(row: &[Data], block: Block) -> Option<Period> {
    let cell = cell_text(row, block.id_col()).to_uppercase();
    if cell.is_empty() {
        return None;
    }

    for (name, month) in MONTHS {
        if cell.contains(name) {
            let year = YEAR_RE
                .captures(&cell)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_else(|| Local::now().year());
            return Some(Period {
                month: *month,
                year,
            });
        }
    }
    None
}

/// Block-specific data-row heuristics. The right block is deliberately
/// looser to tolerate summary-style sub-rows.
pub fn is_data_row(row: &[Data], block: Block) -> bool {
    let id_cell = cell_text(row, block.id_col());
    let ship = cell_text(row, block.ship_col());
    let has_ship = !ship.is_empty()
        && !RESERVED_NAMES
            .iter()
            .any(|reserved| ship.eq_ignore_ascii_case(reserved));

    match block {
        Block::Left => is_numeric(&id_cell) && has_ship,
        Block::Right => {
            let has_trailing_data = (block.line_col()..=block.loading_col())
                .any(|col| !cell_text(row, col).is_empty());
            (is_numeric(&id_cell) && has_ship)
                || (has_ship && has_trailing_data)
                || (ship.eq_ignore_ascii_case("KAPAL") && has_trailing_data)
        }
    }
}
