//! Field extraction and numeric normalization for qualifying data rows

use calamine::Data;

use super::classify::Period;
use super::grid::{cell_text, Block};
use crate::model::CargoCategory;

/// One validated operation recovered from a data row, before entity
/// resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOperation {
    pub ship_name: String,
    pub line_name: String,
    pub country_name: String,
    pub cargo_name: String,
    pub unloading: f64,
    pub loading: f64,
    pub category: CargoCategory,
    pub month: u32,
    pub year: i32,
}

/// Extract one block's fields from a data row. Returns `None` (with a
/// warning) when validation drops the row.
pub fn extract_operation(row: &[Data], block: Block, period: Period) -> Option<RawOperation> {
    let mut ship_name = cell_text(row, block.ship_col());
    let mut line_name = cell_text(row, block.line_col());
    let mut country_name = cell_text(row, block.country_col());
    let mut cargo_name = cell_text(row, block.cargo_col());
    let unloading = parse_numeric(row.get(block.unloading_col()));
    let loading = parse_numeric(row.get(block.loading_col()));

    if block == Block::Right {
        // Synthetic per-month summary row keyed by the carried period
        if ship_name.eq_ignore_ascii_case("KAPAL") {
            ship_name = format!("Container Summary {}/{}", period.month, period.year);
            cargo_name = "CONTAINER".to_string();
        }
        if cargo_name.is_empty() {
            cargo_name = "CONTAINER".to_string();
        }
    }

    if ship_name.is_empty() {
        log::warn!("Skipping {:?} row: empty ship name", block);
        return None;
    }

    if block == Block::Left && cargo_name.is_empty() {
        log::warn!("Skipping {:?} row: empty cargo name for ship {}", block, ship_name);
        return None;
    }

    if line_name.is_empty() {
        line_name = "Unknown".to_string();
    }
    if country_name.is_empty() {
        country_name = "Unknown".to_string();
    }

    let category = CargoCategory::from_cargo_name(&cargo_name);

    Some(RawOperation {
        ship_name,
        line_name,
        country_name,
        cargo_name,
        unloading,
        loading,
        category,
        month: period.month,
        year: period.year,
    })
}

/// Tonnage of a cell: numbers pass through, blanks are zero, text goes
/// through [`normalize_amount`].
pub fn parse_numeric(cell: Option<&Data>) -> f64 {
    match cell {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => normalize_amount(s),
        _ => 0.0,
    }
}

/// Recover a tonnage from free text. Everything but digits and separators is
/// stripped; with both separators present the one occurring last is the
/// decimal point, a lone comma is a decimal comma. Unparseable text is zero.
pub fn normalize_amount(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if dot > comma {
                cleaned.replace(',', "")
            } else {
                cleaned.replace('.', "").replace(',', ".")
            }
        }
        (None, Some(_)) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Data> {
        cells.iter().map(|c| Data::String((*c).to_string())).collect()
    }

    const JAN_2024: Period = Period {
        month: 1,
        year: 2024,
    };

    #[test]
    fn normalize_amount_separator_rules() {
        assert_eq!(normalize_amount(""), 0.0);
        assert_eq!(normalize_amount("   "), 0.0);
        assert_eq!(normalize_amount("100,5"), 100.5);
        assert_eq!(normalize_amount("200,25"), 200.25);
        assert_eq!(normalize_amount("1,234.56"), 1234.56);
        assert_eq!(normalize_amount("1.234,56"), 1234.56);
        assert_eq!(normalize_amount("1234.5"), 1234.5);
        assert_eq!(normalize_amount("12 345,6 ton"), 12345.6);
        assert_eq!(normalize_amount("garbage"), 0.0);
    }

    #[test]
    fn parse_numeric_passthrough() {
        assert_eq!(parse_numeric(Some(&Data::Float(100.5))), 100.5);
        assert_eq!(parse_numeric(Some(&Data::Int(7))), 7.0);
        assert_eq!(parse_numeric(Some(&Data::Empty)), 0.0);
        assert_eq!(parse_numeric(None), 0.0);
        assert_eq!(parse_numeric(Some(&Data::String("100,5".into()))), 100.5);
    }

    #[test]
    fn extracts_left_block_row() {
        let row = text_row(&["1", "MV Test", "Line A", "Indonesia", "STEEL", "100,5", "200,25"]);
        let op = extract_operation(&row, Block::Left, JAN_2024).unwrap();
        assert_eq!(op.ship_name, "MV Test");
        assert_eq!(op.line_name, "Line A");
        assert_eq!(op.country_name, "Indonesia");
        assert_eq!(op.cargo_name, "STEEL");
        assert_eq!(op.unloading, 100.5);
        assert_eq!(op.loading, 200.25);
        assert_eq!(op.category, CargoCategory::Gc);
    }

    #[test]
    fn left_block_drops_missing_cargo() {
        let row = text_row(&["1", "MV Test", "Line A", "Indonesia", "", "100", "200"]);
        assert!(extract_operation(&row, Block::Left, JAN_2024).is_none());
    }

    #[test]
    fn drops_missing_ship_name() {
        let row = text_row(&["1", "", "Line A", "Indonesia", "STEEL", "100", "200"]);
        assert!(extract_operation(&row, Block::Left, JAN_2024).is_none());
    }

    #[test]
    fn defaults_line_and_country() {
        let row = text_row(&["1", "MV Test", "", "", "STEEL", "100", "200"]);
        let op = extract_operation(&row, Block::Left, JAN_2024).unwrap();
        assert_eq!(op.line_name, "Unknown");
        assert_eq!(op.country_name, "Unknown");
    }

    #[test]
    fn right_block_kapal_summary_row() {
        let mut cells = vec![""; 15];
        cells[8] = "";
        cells[9] = "KAPAL";
        cells[13] = "500";
        let op = extract_operation(&text_row(&cells), Block::Right, JAN_2024).unwrap();
        assert_eq!(op.ship_name, "Container Summary 1/2024");
        assert_eq!(op.cargo_name, "CONTAINER");
        assert_eq!(op.category, CargoCategory::Container);
        assert_eq!(op.unloading, 500.0);
    }

    #[test]
    fn right_block_defaults_empty_cargo_to_container() {
        let mut cells = vec![""; 15];
        cells[8] = "2";
        cells[9] = "MV Box";
        cells[13] = "120";
        let op = extract_operation(&text_row(&cells), Block::Right, JAN_2024).unwrap();
        assert_eq!(op.cargo_name, "CONTAINER");
        assert_eq!(op.category, CargoCategory::Container);
    }

    #[test]
    fn gc_block_cargo_named_container_is_container_category() {
        let row = text_row(&["1", "MV Test", "Line A", "Indonesia", "CONTAINER", "10", "0"]);
        let op = extract_operation(&row, Block::Left, JAN_2024).unwrap();
        assert_eq!(op.category, CargoCategory::Container);
    }
}
