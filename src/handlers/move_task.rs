//! Handler for the `move` command.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::error::TaskError;
use taskmgr::engine::repo::TaskRepo;
use taskmgr::engine::resolver::TaskResolver;
use taskmgr::engine::tree::TaskTree;

/// Re-parents a task, or makes it top-level when `parent` is `None`.
///
/// # Errors
/// Returns error if a task cannot be resolved or the move would create a cycle.
pub fn handle(config: &Config, task_ref: &str, parent: Option<&str>) -> Result<()> {
    let mut conn = Db::connect(config)?;
    let tx = conn.transaction()?;

    let resolver = TaskResolver::new(&tx);
    let task = resolver.resolve(task_ref)?.task;
    let parent = parent.map(|p| resolver.resolve(p)).transpose()?.map(|r| r.task);

    if let Some(parent) = &parent {
        let tree = TaskTree::build(&tx)?;
        if tree.would_create_cycle(task.id, parent.id) {
            return Err(TaskError::Cycle {
                task: task.id,
                parent: parent.id,
            }
            .into());
        }
    }

    TaskRepo::new(&tx).set_parent(task.id, parent.as_ref().map(|p| p.id))?;
    tx.commit()?;

    match parent {
        Some(parent) => println!("{} Moved {task} under {parent}", "✓".green()),
        None => println!("{} Moved {task} to the top level", "✓".green()),
    }
    Ok(())
}
