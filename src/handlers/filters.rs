//! Handler for the `filters` command.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::filters::{catalog_lookups, principal_lookups, Scope};
use taskmgr::engine::repo::{CatalogRepo, TaskRepo};

/// Prints the choices each list filter accepts.
///
/// Catalog choices need an acting user and are skipped without one.
///
/// # Errors
/// Returns error if a query fails or the acting user cannot be resolved.
pub fn handle(config: &Config) -> Result<()> {
    let conn = Db::connect(config)?;

    println!("{}", "Scope (--mine):".bold());
    for (key, label) in Scope::lookups() {
        println!("   {} {label}", key.yellow());
    }

    println!("{}", "Principal (--principal):".bold());
    let principals = TaskRepo::new(&conn).principals()?;
    for (key, label) in principal_lookups(&principals) {
        println!("   {} {label}", key.yellow());
    }

    println!("{}", "Catalog (--catalog):".bold());
    match super::acting_user(&conn, config)? {
        Some(user) => {
            let catalogs = CatalogRepo::new(&conn, user.id).get_all()?;
            for (key, label) in catalog_lookups(&catalogs) {
                println!("   {} {label}", key.yellow());
            }
        }
        None => println!("   {}", "(set --user to see your catalogs)".dimmed()),
    }
    Ok(())
}
