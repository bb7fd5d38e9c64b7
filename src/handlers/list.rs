//! Handler for the `list` command.

use anyhow::Result;
use chrono::NaiveDateTime;
use colored::Colorize;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::filters::{
    catalog_task_ids, PrincipalChoice, Scope, TaskFilter, EMPTY_PRINCIPAL_KEY,
};
use taskmgr::engine::progress::{completeness, format_pct, format_timeline, state_label, timeline};
use taskmgr::engine::repo::{CatalogRepo, UserRepo};
use taskmgr::engine::tree::TaskTree;
use taskmgr::engine::types::{Task, User};

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub archived: bool,
    pub mine: bool,
    pub principal: Option<String>,
    pub catalog: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
struct TaskRow {
    id: i64,
    depth: usize,
    icon: String,
    name: String,
    principal: Option<String>,
    weight: i64,
    completeness: f64,
    timeline: Option<f64>,
    state: String,
    start_date: Option<String>,
    end_date: Option<String>,
    finish_date: Option<String>,
}

/// Lists the tasks of a view as an indented tree.
///
/// # Errors
/// Returns error if a filter cannot be resolved or a query fails.
pub fn handle(config: &Config, options: &ListOptions, json: bool) -> Result<()> {
    let conn = Db::connect(config)?;
    let tree = TaskTree::build(&conn)?;
    let users = super::users_by_id(&conn)?;
    let filter = build_filter(&conn, config, &tree, options)?;

    let now = super::now();
    let mut rows = Vec::new();
    for (depth, task) in filter.apply(&tree, &users) {
        rows.push(to_row(&tree, &users, depth, task, now)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print_rows(&rows, options.archived);
    Ok(())
}

fn build_filter(
    conn: &Connection,
    config: &Config,
    tree: &TaskTree,
    options: &ListOptions,
) -> Result<TaskFilter> {
    let mut filter = if options.archived {
        TaskFilter::archived()
    } else {
        TaskFilter::active()
    };

    if options.mine {
        let me = super::require_user(conn, config)?;
        filter = filter.with_scope(Scope::Me, Some(me.id))?;
    }

    if let Some(principal) = options.principal.as_deref() {
        let choice = if principal.eq_ignore_ascii_case(EMPTY_PRINCIPAL_KEY) {
            PrincipalChoice::Empty
        } else {
            PrincipalChoice::User(UserRepo::new(conn).resolve(principal)?.id)
        };
        filter = filter.with_principal(choice);
    }

    if let Some(catalog) = options.catalog.as_deref() {
        let owner = super::require_user(conn, config)?;
        let repo = CatalogRepo::new(conn, owner.id);
        let catalog = repo.resolve(catalog)?;
        let items = repo.items(catalog.id)?;
        filter = filter.with_catalog(catalog_task_ids(tree, &items));
    }

    if let Some(query) = options.search.as_deref() {
        filter = filter.with_search(query);
    }
    Ok(filter)
}

fn to_row(
    tree: &TaskTree,
    users: &HashMap<i64, User>,
    depth: usize,
    task: &Task,
    now: NaiveDateTime,
) -> Result<TaskRow> {
    Ok(TaskRow {
        id: task.id,
        depth,
        icon: task.icon.clone(),
        name: task.name.clone(),
        principal: task
            .principal_id
            .and_then(|id| users.get(&id))
            .map(ToString::to_string),
        weight: task.weight,
        completeness: completeness(tree, task.id)?,
        timeline: timeline(task.start_date, task.end_date, now),
        state: state_label(tree, task.id)?,
        start_date: task.start_date.map(|d| d.to_string()),
        end_date: task.end_date.map(|d| d.to_string()),
        finish_date: task.finish_date.map(|d| d.to_string()),
    })
}

fn print_rows(rows: &[TaskRow], archived: bool) {
    let title = if archived { "Archived Tasks" } else { "Tasks" };
    println!("{} {title}:", "📋".cyan());

    if rows.is_empty() {
        println!("   {}", "(nothing matches)".dimmed());
        return;
    }

    for row in rows {
        let indent = "  ".repeat(row.depth);
        println!(
            "   {indent}{} [{}] {}  {}  w{}  {} {}  {}",
            row.icon,
            row.id.to_string().yellow(),
            row.name,
            row.principal.as_deref().unwrap_or("-").cyan(),
            row.weight,
            format_pct(row.completeness).green(),
            format_timeline(row.timeline).dimmed(),
            row.state
        );
    }
}
