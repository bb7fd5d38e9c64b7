//! Handlers for the `import` and `export` commands.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::repo::TaskRepo;
use taskmgr::engine::transfer::{self, Format};

/// Writes the tasks of a view to a file or stdout.
///
/// # Errors
/// Returns error if the format is unknown or writing fails.
pub fn export(config: &Config, format: &str, archived: bool, output: Option<&Path>) -> Result<()> {
    let format: Format = format.parse()?;
    let conn = Db::connect(config)?;
    let tasks = TaskRepo::new(&conn).get_view(archived)?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            transfer::export(&tasks, format, BufWriter::new(file))?;
            eprintln!(
                "{} Exported {} task(s) to {}",
                "✓".green(),
                tasks.len(),
                path.display()
            );
        }
        None => transfer::export(&tasks, format, io::stdout().lock())?,
    }
    Ok(())
}

/// Reads task records and writes them in one transaction.
///
/// # Errors
/// Returns error if the file cannot be read or any record is rejected.
pub fn import(config: &Config, path: &Path, format: Option<&str>) -> Result<()> {
    let format = match format {
        Some(f) => f.parse::<Format>()?,
        None => guess_format(path)?,
    };
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let records = transfer::read(BufReader::new(file), format)?;

    let mut conn = Db::connect(config)?;
    let summary = transfer::import(&mut conn, &records)?;
    println!(
        "{} Imported {}: {} created, {} updated",
        "✓".green(),
        path.display(),
        summary.created.to_string().yellow(),
        summary.updated.to_string().yellow()
    );
    Ok(())
}

fn guess_format(path: &Path) -> Result<Format> {
    path.extension()
        .and_then(|e| e.to_str())
        .context("Cannot tell the format from the file name; pass --format")?
        .parse()
}
