//! Reporting granularity and period range calculation

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Indonesian month names used for period labels and the signature line
pub const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// English month abbreviations used by the monthly trend table
pub const ENGLISH_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Granularity {
    /// Lenient parse; anything unrecognized falls back to monthly
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "quarterly" => Granularity::Quarterly,
            "semi-annual" => Granularity::SemiAnnual,
            "annual" => Granularity::Annual,
            _ => Granularity::Monthly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::SemiAnnual => "semi-annual",
            Granularity::Annual => "annual",
        }
    }

    /// Indonesian label used in the export filename
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Monthly => "Bulanan",
            Granularity::Quarterly => "Triwulan",
            Granularity::SemiAnnual => "Semester",
            Granularity::Annual => "Tahunan",
        }
    }
}

/// One granularity bucket: a label plus an inclusive date span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSpan {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Ordered period spans for one year; this ordering drives the row order of
/// the generated sheet.
pub fn period_ranges(year: i32, granularity: Granularity) -> Result<Vec<PeriodSpan>> {
    let mut spans = Vec::new();
    match granularity {
        Granularity::Monthly => {
            for month in 1..=12 {
                spans.push(PeriodSpan {
                    label: format!("{} {}", INDONESIAN_MONTHS[(month - 1) as usize], year),
                    start: month_start(year, month)?,
                    end: month_end(year, month)?,
                });
            }
        }
        Granularity::Quarterly => {
            for quarter in 1..=4u32 {
                let first_month = (quarter - 1) * 3 + 1;
                spans.push(PeriodSpan {
                    label: format!("Q{} {}", quarter, year),
                    start: month_start(year, first_month)?,
                    end: month_end(year, first_month + 2)?,
                });
            }
        }
        Granularity::SemiAnnual => {
            spans.push(PeriodSpan {
                label: format!("Semester 1 {}", year),
                start: month_start(year, 1)?,
                end: month_end(year, 6)?,
            });
            spans.push(PeriodSpan {
                label: format!("Semester 2 {}", year),
                start: month_start(year, 7)?,
                end: month_end(year, 12)?,
            });
        }
        Granularity::Annual => {
            spans.push(PeriodSpan {
                label: format!("Tahun {}", year),
                start: month_start(year, 1)?,
                end: month_end(year, 12)?,
            });
        }
    }
    Ok(spans)
}

/// Full calendar year as one inclusive span
pub fn year_span(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    Ok((month_start(year, 1)?, month_end(year, 12)?))
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month: {}/{}", month, year))
}

fn month_end(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month)?
        .pred_opt()
        .with_context(|| format!("Invalid month end: {}/{}", month, year))
}
