//! Handlers for the `catalog` subcommands.
//!
//! Catalogs belong to the acting user; every command here needs one.

use anyhow::Result;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::filters::catalog_task_ids;
use taskmgr::engine::repo::CatalogRepo;
use taskmgr::engine::resolver::TaskResolver;
use taskmgr::engine::tree::TaskTree;
use taskmgr::engine::types::CatalogItem;

/// # Errors
/// Returns error if there is no acting user or the name is empty.
pub fn add(config: &Config, name: &str, ord: i64) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let id = CatalogRepo::new(&conn, owner.id).add(name, ord)?;
    println!(
        "{} Created catalog [{}] {name}",
        "✓".green(),
        id.to_string().yellow()
    );
    Ok(())
}

/// # Errors
/// Returns error if there is no acting user or the query fails.
pub fn list(config: &Config) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let catalogs = CatalogRepo::new(&conn, owner.id).get_all()?;

    println!("{} Catalogs of {owner}:", "🗂".cyan());
    if catalogs.is_empty() {
        println!("   {}", "(none yet)".dimmed());
    }
    for catalog in catalogs {
        println!("   [{}] {catalog}", catalog.id.to_string().yellow());
    }
    Ok(())
}

/// # Errors
/// Returns error if the catalog is not one of the acting user's.
pub fn edit(config: &Config, query: &str, name: Option<&str>, ord: Option<i64>) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let repo = CatalogRepo::new(&conn, owner.id);
    let catalog = repo.resolve(query)?;

    let name = name.unwrap_or(&catalog.name);
    repo.update(catalog.id, name, ord.unwrap_or(catalog.ord))?;
    println!("{} Updated catalog {name}", "✓".green());
    Ok(())
}

/// Adds a task subtree to a catalog.
///
/// # Errors
/// Returns error if the catalog or task cannot be resolved or the level is out of range.
pub fn include(config: &Config, query: &str, task_ref: &str, level: i64) -> Result<()> {
    let mut conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let tx = conn.transaction()?;

    let repo = CatalogRepo::new(&tx, owner.id);
    let catalog = repo.resolve(query)?;
    let task = TaskResolver::new(&tx).resolve(task_ref)?.task;
    let item = CatalogItem {
        id: repo.add_item(catalog.id, task.id, level)?,
        catalog_id: catalog.id,
        task_id: task.id,
        level,
    };
    tx.commit()?;

    println!(
        "{} Item [{}] {} added to {catalog}",
        "✓".green(),
        item.id.to_string().yellow(),
        item.label(&task.name)
    );
    Ok(())
}

/// # Errors
/// Returns error if the item is not in one of the acting user's catalogs.
pub fn drop_item(config: &Config, query: &str, item: i64) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let repo = CatalogRepo::new(&conn, owner.id);
    let catalog = repo.resolve(query)?;
    repo.remove_item(catalog.id, item)?;
    println!("{} Removed item {item} from {catalog}", "✓".green());
    Ok(())
}

/// Shows a catalog's items and the tasks they expand to.
///
/// # Errors
/// Returns error if the catalog is not one of the acting user's.
pub fn show(config: &Config, query: &str) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let repo = CatalogRepo::new(&conn, owner.id);
    let catalog = repo.resolve(query)?;
    let items = repo.items(catalog.id)?;
    let tree = TaskTree::build(&conn)?;

    println!("{} {catalog}", "🗂".cyan());
    for item in &items {
        let name = tree
            .get(item.task_id)
            .map_or_else(|| item.task_id.to_string(), |t| t.name.clone());
        println!(
            "   [{}] {}",
            item.id.to_string().yellow(),
            item.label(&name)
        );
    }

    let ids = catalog_task_ids(&tree, &items);
    println!("\n   {} {} task(s):", "Covers".bold(), ids.len());
    for (depth, task) in tree.walk() {
        if ids.contains(&task.id) {
            println!("   {}{task}", "  ".repeat(depth));
        }
    }
    Ok(())
}

/// # Errors
/// Returns error if the catalog is not one of the acting user's.
pub fn delete(config: &Config, query: &str) -> Result<()> {
    let conn = Db::connect(config)?;
    let owner = super::require_user(&conn, config)?;
    let repo = CatalogRepo::new(&conn, owner.id);
    let catalog = repo.resolve(query)?;
    repo.delete(catalog.id)?;
    println!("{} Deleted catalog {catalog}", "✓".green());
    Ok(())
}
