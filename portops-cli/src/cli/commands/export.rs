//! Export command handler

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Datelike, Local};
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::model::CargoCategory;
use crate::report::{self, period::Granularity, ExportFilters};
use crate::storage::{self, repository::shipping_lines};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file or directory; in a directory the report filename is
    /// generated from the granularity and years
    pub output: Option<PathBuf>,

    /// Reporting granularity: monthly, quarterly, semi-annual or annual
    #[arg(long, default_value = "monthly")]
    pub period: String,

    /// Comma-separated years, e.g. 2023,2024
    #[arg(long)]
    pub years: Option<String>,

    /// Cargo category filter: GC, CONTAINER or all
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Restrict to one shipping line by name
    #[arg(long)]
    pub shipping_line: Option<String>,

    /// Free-text search carried through from the UI; not applied by the
    /// report engine
    #[arg(long)]
    pub search: Option<String>,

    /// Owner id whose records are exported
    #[arg(long, default_value_t = 1)]
    pub user: i64,
}

pub async fn handle_export_command(config: &Config, args: ExportArgs) -> Result<()> {
    let pool = storage::open(&config.db_path).await?;

    let granularity = Granularity::parse(&args.period);
    let requested = args
        .years
        .as_deref()
        .map(report::parse_years)
        .unwrap_or_default();
    let years = report::validate_years(&requested, Local::now().year());

    let shipping_line = match &args.shipping_line {
        Some(name) => match shipping_lines::find_by_name(&pool, name).await? {
            Some(line) => Some(line.id),
            None => bail!("Unknown shipping line: {}", name),
        },
        None => None,
    };

    let filters = ExportFilters {
        cargo_category: CargoCategory::parse_filter(&args.category),
        shipping_line,
        search: args.search.clone(),
    };

    log::info!("Exporting {} report for years {:?}", granularity.as_str(), years);
    let sheets = report::build_report(&pool, args.user, &filters, granularity, &years).await?;

    let filename = report::export_filename(granularity, &years);
    let path = match args.output {
        Some(path) if path.is_dir() => path.join(&filename),
        Some(path) => path,
        None => PathBuf::from(&filename),
    };
    report::writer::write_workbook(&sheets, &path)?;

    println!(
        "{} {} sheet(s) written to {}",
        "Export complete:".bright_green().bold(),
        sheets.len(),
        path.display().to_string().cyan()
    );

    Ok(())
}
