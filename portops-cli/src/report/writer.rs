//! Write built sheets to an xlsx workbook
//!
//! Cells and structural merges only; fills, fonts and borders are a
//! downstream concern driven by the position side-channel.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use super::grid::{Cell, MergeRange, COLUMN_WIDTHS};
use super::SheetData;

pub fn write_workbook(sheets: &[SheetData], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let format = Format::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        // Merge anchors get written through merge_range; everything inside a
        // merged span stays untouched.
        let anchors: HashMap<(u32, u16), MergeRange> = sheet
            .positions
            .merge_ranges
            .iter()
            .map(|merge| ((merge.first_row, merge.first_col), *merge))
            .collect();

        for (row_idx, row) in sheet.grid.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let row_num = row_idx as u32;
                let col_num = col_idx as u16;

                if let Some(merge) = anchors.get(&(row_num, col_num)) {
                    let text = match cell {
                        Cell::Text(text) => text.as_str(),
                        _ => "",
                    };
                    worksheet.merge_range(
                        merge.first_row,
                        merge.first_col,
                        merge.last_row,
                        merge.last_col,
                        text,
                        &format,
                    )?;
                    continue;
                }

                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col_num, *number)?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}
