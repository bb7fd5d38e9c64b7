//! Handler for the `init` command.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;

/// Creates the database file and schema.
///
/// # Errors
/// Returns error if database initialization fails.
pub fn handle(config: &Config) -> Result<()> {
    Db::init(config)?;
    println!("{} Initialized {}", "✓".green(), config.db_path.display());
    Ok(())
}
