//! Import command handler

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::{ingest, storage};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Production spreadsheet (.xlsx or .xls)
    pub file: PathBuf,

    /// Owner id recorded on every imported row
    #[arg(long, default_value_t = 1)]
    pub user: i64,
}

pub async fn handle_import_command(config: &Config, args: ImportArgs) -> Result<()> {
    let pool = storage::open(&config.db_path).await?;

    let outcome = ingest::import_workbook(&pool, &args.file, args.user).await?;

    println!(
        "{} {} rows imported from {} of {} sheets ({} rows skipped)",
        "Import complete:".bright_green().bold(),
        outcome.rows_imported,
        outcome.sheets_processed,
        outcome.sheets_seen,
        outcome.rows_skipped
    );
    if outcome.sheets_processed == 0 {
        println!(
            "{}",
            "No sheet matched the production layout; nothing was imported.".yellow()
        );
    }

    Ok(())
}
