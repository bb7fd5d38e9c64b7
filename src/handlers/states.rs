//! Handlers for the `state` subcommands.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::progress::format_pct;
use taskmgr::engine::repo::StateRepo;
use taskmgr::engine::types::State;

/// Field changes for a state. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct StateEdit {
    pub name: Option<String>,
    pub pct: Option<f64>,
    pub icon: Option<String>,
    pub ord: Option<i64>,
    pub in_actions: Option<bool>,
}

/// # Errors
/// Returns error if the state is invalid or the insertion fails.
pub fn add(
    config: &Config,
    name: &str,
    pct: f64,
    icon: &str,
    ord: i64,
    in_actions: bool,
) -> Result<()> {
    let conn = Db::connect(config)?;
    let state = State {
        id: 0,
        icon: icon.to_string(),
        name: name.to_string(),
        pct,
        ord,
        in_actions,
    };
    let id = StateRepo::new(&conn).add(&state)?;
    println!("{} Added state [{}] {state}", "✓".green(), id.to_string().yellow());
    Ok(())
}

/// # Errors
/// Returns error if the query fails.
pub fn list(config: &Config) -> Result<()> {
    let conn = Db::connect(config)?;
    let states = StateRepo::new(&conn).get_all()?;

    println!("{} States:", "🏷".cyan());
    if states.is_empty() {
        println!("   {}", "(none yet)".dimmed());
    }
    for state in states {
        let menu = if state.in_actions { "action" } else { "" };
        println!(
            "   [{}] {state}  {}  {}",
            state.id.to_string().yellow(),
            format_pct(state.pct).green(),
            menu.dimmed()
        );
    }
    Ok(())
}

/// # Errors
/// Returns error if the state cannot be resolved or the new values are invalid.
pub fn edit(config: &Config, query: &str, edit: &StateEdit) -> Result<()> {
    let conn = Db::connect(config)?;
    let repo = StateRepo::new(&conn);
    let mut state = repo.resolve(query)?;

    if let Some(name) = &edit.name {
        state.name.clone_from(name);
    }
    if let Some(icon) = &edit.icon {
        state.icon.clone_from(icon);
    }
    state.pct = edit.pct.unwrap_or(state.pct);
    state.ord = edit.ord.unwrap_or(state.ord);
    state.in_actions = edit.in_actions.unwrap_or(state.in_actions);

    repo.update(&state)?;
    println!("{} Updated state {state}", "✓".green());
    Ok(())
}

/// # Errors
/// Returns error if the state cannot be resolved.
pub fn delete(config: &Config, query: &str) -> Result<()> {
    let conn = Db::connect(config)?;
    let repo = StateRepo::new(&conn);
    let state = repo.resolve(query)?;
    repo.delete(state.id)?;
    println!("{} Deleted state {state}", "✓".green());
    Ok(())
}
