//! Command-line interface definitions and dispatch

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "portops-cli",
    about = "Port production bookkeeping and spreadsheet interchange",
    version
)]
pub struct Cli {
    /// Path to the SQLite database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import production spreadsheets into the database
    Import(commands::import::ImportArgs),
    /// Export production reports as a spreadsheet
    Export(commands::export::ExportArgs),
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.db)?;
    match cli.command {
        Commands::Import(args) => commands::import::handle_import_command(&config, args).await,
        Commands::Export(args) => commands::export::handle_export_command(&config, args).await,
    }
}
