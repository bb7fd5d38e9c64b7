//! Task import/export in JSON or CSV, with every stored field.

use super::repo::TaskRepo;
use super::tree::TaskTree;
use super::types::Task;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => bail!("Unknown format '{other}' (expected 'json' or 'csv')"),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

/// Writes tasks to `out`.
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub fn export<W: Write>(tasks: &[Task], format: Format, mut out: W) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, tasks).context("JSON export failed")?;
            writeln!(out)?;
        }
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for task in tasks {
                writer.serialize(task).context("CSV export failed")?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Parses task records previously produced by [`export`].
///
/// # Errors
/// Returns an error if the input is malformed.
pub fn read<R: Read>(input: R, format: Format) -> Result<Vec<Task>> {
    match format {
        Format::Json => serde_json::from_reader(input).context("Invalid JSON task records"),
        Format::Csv => {
            let mut reader = csv::Reader::from_reader(input);
            let mut tasks = Vec::new();
            for record in reader.deserialize() {
                tasks.push(record.context("Invalid CSV task record")?);
            }
            Ok(tasks)
        }
    }
}

/// Writes records in one transaction: rows whose id exists are updated,
/// the rest are inserted under their own id.
///
/// Parent references may point forward within the batch; the resulting
/// tree must stay acyclic.
///
/// # Errors
/// Returns an error (and writes nothing) if any record is invalid.
pub fn import(conn: &mut Connection, records: &[Task]) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;

    let mut summary = ImportSummary::default();
    {
        let repo = TaskRepo::new(&tx);
        for record in records {
            let exists = repo.find_by_id(record.id)?.is_some();
            repo.upsert(record)
                .with_context(|| format!("Record {} rejected", record.id))?;
            if exists {
                summary.updated += 1;
            } else {
                summary.created += 1;
            }
        }
    }

    if TaskTree::build(&tx)?.has_cycle() {
        bail!("Imported parent references form a cycle");
    }

    tx.commit().context("Import failed on commit")?;
    info!(created = summary.created, updated = summary.updated, "tasks imported");
    Ok(summary)
}
