//! Catalog Repository: owner-scoped workspaces and their items.

use crate::engine::error::TaskError;
use crate::engine::types::{validate_level, Catalog, CatalogItem};
use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

const CATALOG_SELECT: &str = "SELECT id, name, ord, owner_id FROM catalogs";

/// Every query is restricted to catalogs owned by `owner_id`.
pub struct CatalogRepo<'a> {
    conn: &'a Connection,
    owner_id: i64,
}

impl<'a> CatalogRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection, owner_id: i64) -> Self {
        Self { conn, owner_id }
    }

    /// Creates a catalog owned by the acting user.
    ///
    /// # Errors
    /// Returns an error if the name is empty or the insertion fails.
    pub fn add(&self, name: &str, ord: i64) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(TaskError::EmptyName.into());
        }
        self.conn.execute(
            "INSERT INTO catalogs (name, ord, owner_id) VALUES (?1, ?2, ?3)",
            params![name, ord, self.owner_id],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, name, owner = self.owner_id, "catalog added");
        Ok(id)
    }

    /// Owned catalogs, ordered by `ord`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Catalog>> {
        let sql = format!("{CATALOG_SELECT} WHERE owner_id = ?1 ORDER BY ord, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.owner_id], Self::row_to_catalog)?;
        let mut catalogs = Vec::new();
        for c in rows {
            catalogs.push(c?);
        }
        Ok(catalogs)
    }

    /// # Errors
    /// Returns `TaskError::CatalogNotFound` if the catalog is missing or owned by someone else.
    pub fn require(&self, id: i64) -> Result<Catalog> {
        let sql = format!("{CATALOG_SELECT} WHERE id = ?1 AND owner_id = ?2");
        self.conn
            .query_row(&sql, params![id, self.owner_id], Self::row_to_catalog)
            .optional()?
            .ok_or_else(|| TaskError::CatalogNotFound(id).into())
    }

    /// Resolves an owned catalog by id or name (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if nothing matches.
    pub fn resolve(&self, query: &str) -> Result<Catalog> {
        if let Ok(id) = query.parse::<i64>() {
            if let Ok(catalog) = self.require(id) {
                return Ok(catalog);
            }
        }
        let sql = format!(
            "{CATALOG_SELECT} WHERE owner_id = ?1 AND LOWER(name) = LOWER(?2) ORDER BY ord, id"
        );
        match self
            .conn
            .query_row(&sql, params![self.owner_id, query], Self::row_to_catalog)
            .optional()?
        {
            Some(catalog) => Ok(catalog),
            None => bail!("No catalog of yours matches '{query}'"),
        }
    }

    /// # Errors
    /// Returns an error if the name is empty, the catalog is not owned or the update fails.
    pub fn update(&self, id: i64, name: &str, ord: i64) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TaskError::EmptyName.into());
        }
        self.require(id)?;
        self.conn.execute(
            "UPDATE catalogs SET name = ?2, ord = ?3 WHERE id = ?1",
            params![id, name, ord],
        )?;
        Ok(())
    }

    /// Deletes a catalog together with its items.
    ///
    /// # Errors
    /// Returns an error if the catalog is not owned.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.require(id)?;
        self.conn
            .execute("DELETE FROM catalogs WHERE id = ?1", params![id])?;
        info!(id, "catalog deleted");
        Ok(())
    }

    /// Adds a subtree (task + depth) to a catalog.
    ///
    /// # Errors
    /// Returns an error if the level is out of range or the references are invalid.
    pub fn add_item(&self, catalog_id: i64, task_id: i64, level: i64) -> Result<i64> {
        validate_level(level)?;
        self.require(catalog_id)?;
        self.conn.execute(
            "INSERT INTO catalog_items (catalog_id, task_id, level) VALUES (?1, ?2, ?3)",
            params![catalog_id, task_id, level],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, catalog_id, task_id, level, "catalog item added");
        Ok(id)
    }

    /// # Errors
    /// Returns an error if the item does not belong to an owned catalog.
    pub fn remove_item(&self, catalog_id: i64, item_id: i64) -> Result<()> {
        self.require(catalog_id)?;
        let changed = self.conn.execute(
            "DELETE FROM catalog_items WHERE id = ?1 AND catalog_id = ?2",
            params![item_id, catalog_id],
        )?;
        if changed == 0 {
            bail!("Catalog {catalog_id} has no item {item_id}");
        }
        Ok(())
    }

    /// Items of an owned catalog, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the catalog is not owned or the query fails.
    pub fn items(&self, catalog_id: i64) -> Result<Vec<CatalogItem>> {
        self.require(catalog_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, catalog_id, task_id, level FROM catalog_items
             WHERE catalog_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![catalog_id], |r| {
            Ok(CatalogItem {
                id: r.get(0)?,
                catalog_id: r.get(1)?,
                task_id: r.get(2)?,
                level: r.get(3)?,
            })
        })?;
        let mut items = Vec::new();
        for i in rows {
            items.push(i?);
        }
        Ok(items)
    }

    fn row_to_catalog(row: &rusqlite::Row) -> rusqlite::Result<Catalog> {
        Ok(Catalog {
            id: row.get(0)?,
            name: row.get(1)?,
            ord: row.get(2)?,
            owner_id: row.get(3)?,
        })
    }
}
