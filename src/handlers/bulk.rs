//! Handlers for the bulk actions: `mark`, `archive`, `restore`, `actions`.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::actions::{self, BulkAction};
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::repo::StateRepo;
use taskmgr::engine::resolver::TaskResolver;

/// Assigns a menu state to exactly the selected tasks.
///
/// # Errors
/// Returns error if the state is not in the action menu or a task cannot be resolved.
pub fn mark(config: &Config, state: &str, tasks: &[String]) -> Result<()> {
    let conn = Db::connect(config)?;
    let state = StateRepo::new(&conn).resolve(state)?;
    run(config, &actions::mark_with(state)?, tasks)
}

/// Archives the selected tasks and their subtrees.
///
/// # Errors
/// Returns error if a task cannot be resolved.
pub fn archive(config: &Config, tasks: &[String]) -> Result<()> {
    run(config, &BulkAction::Archive, tasks)
}

/// Restores the selected tasks and their subtrees.
///
/// # Errors
/// Returns error if a task cannot be resolved.
pub fn restore(config: &Config, tasks: &[String]) -> Result<()> {
    run(config, &BulkAction::Restore, tasks)
}

/// Prints the action menu of a view.
///
/// # Errors
/// Returns error if the states query fails.
pub fn menu(config: &Config, archived: bool) -> Result<()> {
    let conn = Db::connect(config)?;
    let view = if archived { "archived" } else { "active" };
    println!("{} Actions ({view} view):", "⚡".yellow());
    for action in actions::available(&conn, archived)? {
        println!("   {action}");
    }
    Ok(())
}

fn run(config: &Config, action: &BulkAction, tasks: &[String]) -> Result<()> {
    let mut conn = Db::connect(config)?;
    let tx = conn.transaction()?;

    let selected = TaskResolver::strict(&tx).resolve_all(tasks)?;
    let ids: Vec<i64> = selected.iter().map(|t| t.id).collect();
    let changed = actions::apply(&tx, action, &ids)?;
    tx.commit()?;

    println!(
        "{} {action}: {} selected, {} updated",
        "✓".green(),
        ids.len(),
        changed.to_string().yellow()
    );
    Ok(())
}
