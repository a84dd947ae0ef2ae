//! Runtime configuration (database location)

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable that overrides the default database location
pub const DB_ENV_VAR: &str = "PORTOPS_DB";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database path: CLI flag > env var > platform data dir
    pub fn resolve(flag: Option<PathBuf>) -> Result<Config> {
        let db_path = match flag {
            Some(path) => path,
            None => match std::env::var(DB_ENV_VAR) {
                Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
                _ => default_db_path()?,
            },
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        Ok(Config { db_path })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine platform data directory")?;
    Ok(data_dir.join("portops").join("portops.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_takes_precedence() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/portops-test.db"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/portops-test.db"));
    }
}
