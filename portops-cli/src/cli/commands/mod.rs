//! Subcommand argument structs and handlers

pub mod export;
pub mod import;
