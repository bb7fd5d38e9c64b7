//! Handler for the `show` command.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::progress::{completeness, format_pct, format_timeline, state_label, timeline};
use taskmgr::engine::resolver::TaskResolver;
use taskmgr::engine::tree::TaskTree;

/// Shows one task's fields, progress, and direct children.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(config: &Config, task_ref: &str) -> Result<()> {
    let conn = Db::connect(config)?;
    let resolved = TaskResolver::new(&conn).resolve(task_ref)?;
    let tree = TaskTree::build(&conn)?;
    let users = super::users_by_id(&conn)?;
    let task = &resolved.task;

    if resolved.confidence < 1.0 {
        println!(
            "{} Matched '{}' ({:.0}% confidence)",
            "?".yellow(),
            task.name,
            resolved.confidence * 100.0
        );
    }

    println!("{} {task}", "📌".cyan());
    if task.archived {
        println!("   {}", "(archived)".dimmed());
    }
    if let Some(desc) = &task.desc {
        println!("   {desc}");
    }

    let path: Vec<String> = tree
        .ancestors(task.id)
        .iter()
        .rev()
        .filter_map(|id| tree.get(*id))
        .map(|t| t.name.clone())
        .collect();
    if !path.is_empty() {
        println!("   {} {}", "Path:".dimmed(), path.join(" / "));
    }

    let principal = task
        .principal_id
        .and_then(|id| users.get(&id))
        .map_or_else(|| "-".to_string(), ToString::to_string);
    println!("   {} {principal}", "Principal:".dimmed());
    println!("   {} {}", "Weight:".dimmed(), task.weight);
    println!(
        "   {} {}",
        "Complete:".dimmed(),
        format_pct(completeness(&tree, task.id)?).green()
    );
    println!(
        "   {} {}",
        "Timeline:".dimmed(),
        format_timeline(timeline(task.start_date, task.end_date, super::now()))
    );
    println!("   {} {}", "State:".dimmed(), state_label(&tree, task.id)?);

    let dates = [
        ("Start:", task.start_date),
        ("End:", task.end_date),
        ("Finished:", task.finish_date),
    ];
    for (label, date) in dates {
        if let Some(date) = date {
            println!("   {} {date}", label.dimmed());
        }
    }

    let children = tree.children(task.id);
    if !children.is_empty() {
        println!("\n   {}", "Children:".bold());
        for child in children {
            println!(
                "   {} {child}  {}",
                "↳".cyan(),
                format_pct(completeness(&tree, child.id)?).green()
            );
        }
    }
    Ok(())
}
