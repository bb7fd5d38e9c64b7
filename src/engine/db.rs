//! Database bootstrap: opening connections and applying the schema.

use super::config::Config;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::fs;
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS states (
    id INTEGER PRIMARY KEY,
    icon TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    pct REAL NOT NULL CHECK (pct >= 0 AND pct <= 1),
    ord INTEGER NOT NULL DEFAULT 0,
    in_actions INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '📦',
    description TEXT,
    principal_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    weight INTEGER NOT NULL DEFAULT 1 CHECK (weight >= 1 AND weight <= 100),
    start_date TEXT,
    end_date TEXT,
    state_id INTEGER REFERENCES states(id) ON DELETE SET NULL,
    finish_date TEXT,
    parent_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
    archived INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_id);

CREATE TABLE IF NOT EXISTS catalogs (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    ord INTEGER NOT NULL DEFAULT 0,
    owner_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS catalog_items (
    id INTEGER PRIMARY KEY,
    catalog_id INTEGER NOT NULL REFERENCES catalogs(id) ON DELETE CASCADE,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    level INTEGER NOT NULL DEFAULT 0 CHECK (level >= -1 AND level <= 100)
);
";

pub struct Db;

impl Db {
    /// Creates the database file (and its directory) and applies the schema.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(config: &Config) -> Result<Connection> {
        if let Some(dir) = config.db_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let conn = Connection::open(&config.db_path).context("Failed to open database")?;
        Self::prepare(&conn)?;
        Self::migrate(&conn)?;
        debug!(path = %config.db_path.display(), "database initialized");
        Ok(conn)
    }

    /// Connects to an existing database.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect(config: &Config) -> Result<Connection> {
        if !config.db_path.exists() {
            bail!(
                "No database at {}. Run `taskmgr init` first.",
                config.db_path.display()
            );
        }
        let conn = Connection::open(&config.db_path).context("Failed to open database")?;
        Self::prepare(&conn)?;
        Ok(conn)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns error if migration fails.
    pub fn open_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::prepare(&conn)?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    fn prepare(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA).context("Failed to apply schema")
    }
}
