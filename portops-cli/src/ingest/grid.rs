//! Two-block geometry of the production grid
//!
//! The sheet carries two side-by-side blocks with identical column layouts:
//! GC in columns A-G and CONTAINER in columns I-O, separated by a spacer
//! column. All offset arithmetic lives here.

use calamine::Data;

use crate::model::CargoCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// GC block, columns A-G
    Left,
    /// CONTAINER block, columns I-O
    Right,
}

impl Block {
    pub const ALL: [Block; 2] = [Block::Left, Block::Right];

    pub const fn start_col(self) -> usize {
        match self {
            Block::Left => 0,
            Block::Right => 8,
        }
    }

    pub const fn category(self) -> CargoCategory {
        match self {
            Block::Left => CargoCategory::Gc,
            Block::Right => CargoCategory::Container,
        }
    }

    pub const fn id_col(self) -> usize {
        self.start_col()
    }

    pub const fn ship_col(self) -> usize {
        self.start_col() + 1
    }

    pub const fn line_col(self) -> usize {
        self.start_col() + 2
    }

    pub const fn country_col(self) -> usize {
        self.start_col() + 3
    }

    pub const fn cargo_col(self) -> usize {
        self.start_col() + 4
    }

    pub const fn unloading_col(self) -> usize {
        self.start_col() + 5
    }

    pub const fn loading_col(self) -> usize {
        self.start_col() + 6
    }
}

/// Trimmed text content of a cell; empty string for anything non-scalar
pub fn cell_text(row: &[Data], col: usize) -> String {
    match row.get(col) {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Some(Data::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn cell_is_blank(row: &[Data], col: usize) -> bool {
    cell_text(row, col).is_empty()
}

pub fn row_is_blank(row: &[Data]) -> bool {
    (0..row.len()).all(|col| cell_is_blank(row, col))
}

/// Whether a cell's text reads as a number (the "NO" column check)
pub fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_offsets() {
        assert_eq!(Block::Left.id_col(), 0);
        assert_eq!(Block::Left.loading_col(), 6);
        assert_eq!(Block::Right.id_col(), 8);
        assert_eq!(Block::Right.ship_col(), 9);
        assert_eq!(Block::Right.loading_col(), 14);
    }

    #[test]
    fn cell_text_conversions() {
        let row = vec![
            Data::String("  MV Test  ".into()),
            Data::Int(3),
            Data::Float(2.0),
            Data::Float(2.5),
            Data::Empty,
        ];
        assert_eq!(cell_text(&row, 0), "MV Test");
        assert_eq!(cell_text(&row, 1), "3");
        assert_eq!(cell_text(&row, 2), "2");
        assert_eq!(cell_text(&row, 3), "2.5");
        assert_eq!(cell_text(&row, 4), "");
        assert_eq!(cell_text(&row, 99), "");
    }

    #[test]
    fn blank_row_detection() {
        assert!(row_is_blank(&[Data::Empty, Data::String("   ".into())]));
        assert!(!row_is_blank(&[Data::Empty, Data::String("x".into())]));
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("1"));
        assert!(is_numeric("2.5"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("NO"));
    }
}
