//! Handler for the `add` command.

use super::edit::TaskEdit;
use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::repo::{TaskRepo, UserRepo};
use taskmgr::engine::resolver::TaskResolver;
use taskmgr::engine::types::NewTask;

/// Adds a task, optionally under a parent.
///
/// # Errors
/// Returns error if the parent or principal cannot be resolved or a field is invalid.
pub fn handle(config: &Config, name: &str, parent: Option<&str>, fields: &TaskEdit) -> Result<()> {
    let mut conn = Db::connect(config)?;
    let tx = conn.transaction()?;

    let mut task = NewTask::new(name);
    if let Some(parent_ref) = parent {
        let parent = TaskResolver::new(&tx).resolve(parent_ref)?.task;
        task.parent_id = Some(parent.id);
    }
    if let Some(principal) = &fields.principal {
        task.principal_id = Some(UserRepo::new(&tx).resolve(principal)?.id);
    }
    if let Some(icon) = &fields.icon {
        task.icon.clone_from(icon);
    }
    if let Some(weight) = fields.weight {
        task.weight = weight;
    }
    task.desc.clone_from(&fields.desc);
    task.start_date = fields.start;
    task.end_date = fields.end;

    let id = TaskRepo::new(&tx).add(&task)?;
    tx.commit()?;

    println!(
        "{} Added {} [{}] {}",
        "✓".green(),
        task.icon,
        id.to_string().yellow(),
        task.name
    );
    if let Some(parent_id) = task.parent_id {
        println!("   {} under [{}]", "↳".cyan(), parent_id);
    }
    Ok(())
}
