//! User Repository: principals and catalog owners.

use crate::engine::error::TaskError;
use crate::engine::types::User;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

const USER_SELECT: &str = "SELECT id, full_name, phone FROM users";

pub struct UserRepo<'a> {
    conn: &'a Connection,
}

impl<'a> UserRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// # Errors
    /// Returns an error if the name is empty or the insertion fails.
    pub fn add(&self, full_name: &str, phone: Option<&str>) -> Result<i64> {
        if full_name.trim().is_empty() {
            return Err(TaskError::EmptyName.into());
        }
        self.conn.execute(
            "INSERT INTO users (full_name, phone) VALUES (?1, ?2)",
            params![full_name, phone],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, full_name, "user added");
        Ok(id)
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<User>> {
        self.collect(&format!("{USER_SELECT} ORDER BY id"), params![])
    }

    /// Case-insensitive substring search over full name and phone.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn search(&self, query: &str) -> Result<Vec<User>> {
        let sql = format!(
            "{USER_SELECT} WHERE LOWER(full_name) LIKE '%' || LOWER(?1) || '%'
             OR LOWER(COALESCE(phone, '')) LIKE '%' || LOWER(?1) || '%'
             ORDER BY id"
        );
        self.collect(&sql, params![query])
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], Self::row_to_user)
            .optional()
            .context("User lookup failed")
    }

    /// Resolves a user by id or exact full name (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if nothing matches or the name is ambiguous.
    pub fn resolve(&self, query: &str) -> Result<User> {
        if let Ok(id) = query.parse::<i64>() {
            if let Some(user) = self.find_by_id(id)? {
                return Ok(user);
            }
        }
        let sql = format!("{USER_SELECT} WHERE LOWER(full_name) = LOWER(?1) ORDER BY id");
        let mut matches = self.collect(&sql, params![query])?;
        match matches.len() {
            0 => bail!("No user matches '{query}'"),
            1 => Ok(matches.remove(0)),
            n => bail!("'{query}' matches {n} users; use the id instead"),
        }
    }

    fn collect<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_user)?;
        let mut users = Vec::new();
        for u in rows {
            users.push(u?);
        }
        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            full_name: row.get(1)?,
            phone: row.get(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;

    #[test]
    fn test_search_matches_name_or_phone() {
        let conn = Db::open_in_memory().unwrap();
        let repo = UserRepo::new(&conn);
        let ada = repo.add("Ada Lovelace", Some("555-0100")).unwrap();
        let alan = repo.add("Alan Turing", None).unwrap();

        let by_name: Vec<_> = repo.search("lovel").unwrap().iter().map(|u| u.id).collect();
        assert_eq!(by_name, vec![ada]);
        let by_phone: Vec<_> = repo.search("0100").unwrap().iter().map(|u| u.id).collect();
        assert_eq!(by_phone, vec![ada]);
        assert_eq!(repo.search("a").unwrap().len(), 2);
        assert_eq!(repo.resolve("alan turing").unwrap().id, alan);
    }

    #[test]
    fn test_resolve_ambiguous_name() {
        let conn = Db::open_in_memory().unwrap();
        let repo = UserRepo::new(&conn);
        repo.add("Sam", None).unwrap();
        repo.add("Sam", None).unwrap();
        assert!(repo.resolve("Sam").is_err());
        assert!(repo.resolve("1").is_ok());
    }
}
