//! Handlers for the `user` subcommands.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::repo::UserRepo;

/// # Errors
/// Returns error if the name is empty or the insertion fails.
pub fn add(config: &Config, full_name: &str, phone: Option<&str>) -> Result<()> {
    let conn = Db::connect(config)?;
    let id = UserRepo::new(&conn).add(full_name, phone)?;
    println!(
        "{} Added user [{}] {full_name}",
        "✓".green(),
        id.to_string().yellow()
    );
    Ok(())
}

/// Lists users, optionally narrowed by a name or phone fragment.
///
/// # Errors
/// Returns error if the query fails.
pub fn list(config: &Config, search: Option<&str>) -> Result<()> {
    let conn = Db::connect(config)?;
    let repo = UserRepo::new(&conn);
    let users = match search {
        Some(query) => repo.search(query)?,
        None => repo.get_all()?,
    };

    println!("{} Users:", "👤".cyan());
    if users.is_empty() {
        println!("   {}", "(nothing matches)".dimmed());
    }
    for user in users {
        println!(
            "   [{}] {}  {}",
            user.id.to_string().yellow(),
            user.full_name,
            user.phone.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}
