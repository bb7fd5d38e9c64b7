//! State Repository: completion labels.

use crate::engine::error::TaskError;
use crate::engine::types::State;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

const STATE_SELECT: &str = "SELECT id, icon, name, pct, ord, in_actions FROM states";

pub struct StateRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StateRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a state. The `id` field of the argument is ignored.
    ///
    /// # Errors
    /// Returns an error if validation or the insertion fails.
    pub fn add(&self, state: &State) -> Result<i64> {
        state.validate()?;
        self.conn.execute(
            "INSERT INTO states (icon, name, pct, ord, in_actions) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![state.icon, state.name, state.pct, state.ord, state.in_actions],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, name = %state.name, "state added");
        Ok(id)
    }

    /// # Errors
    /// Returns an error if validation fails or the state does not exist.
    pub fn update(&self, state: &State) -> Result<()> {
        state.validate()?;
        let changed = self.conn.execute(
            "UPDATE states SET icon = ?2, name = ?3, pct = ?4, ord = ?5, in_actions = ?6
             WHERE id = ?1",
            params![
                state.id,
                state.icon,
                state.name,
                state.pct,
                state.ord,
                state.in_actions
            ],
        )?;
        if changed == 0 {
            return Err(TaskError::StateNotFound(state.id).into());
        }
        Ok(())
    }

    /// Deletes a state; tasks carrying it fall back to no state.
    ///
    /// # Errors
    /// Returns an error if the state does not exist.
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM states WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(TaskError::StateNotFound(id).into());
        }
        info!(id, "state deleted");
        Ok(())
    }

    /// All states in display order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<State>> {
        self.collect(&format!("{STATE_SELECT} ORDER BY ord, id"))
    }

    /// States offered in the bulk-action menu, in display order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn in_actions(&self) -> Result<Vec<State>> {
        self.collect(&format!(
            "{STATE_SELECT} WHERE in_actions = 1 ORDER BY ord, id"
        ))
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<State>> {
        let sql = format!("{STATE_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], Self::row_to_state)
            .optional()
            .context("State lookup failed")
    }

    /// Resolves a state by id or by name (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if nothing matches.
    pub fn resolve(&self, query: &str) -> Result<State> {
        if let Ok(id) = query.parse::<i64>() {
            if let Some(state) = self.find_by_id(id)? {
                return Ok(state);
            }
        }
        let sql = format!("{STATE_SELECT} WHERE LOWER(name) = LOWER(?1) ORDER BY ord, id");
        self.conn
            .query_row(&sql, params![query], Self::row_to_state)
            .optional()?
            .ok_or_else(|| anyhow::anyhow!("No state matches '{query}'"))
    }

    fn collect(&self, sql: &str) -> Result<Vec<State>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], Self::row_to_state)?;
        let mut states = Vec::new();
        for s in rows {
            states.push(s?);
        }
        Ok(states)
    }

    fn row_to_state(row: &rusqlite::Row) -> rusqlite::Result<State> {
        Ok(State {
            id: row.get(0)?,
            icon: row.get(1)?,
            name: row.get(2)?,
            pct: row.get(3)?,
            ord: row.get(4)?,
            in_actions: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use crate::engine::repo::TaskRepo;
    use crate::engine::types::NewTask;

    fn state(name: &str, pct: f64, ord: i64, in_actions: bool) -> State {
        State {
            id: 0,
            icon: String::new(),
            name: name.to_string(),
            pct,
            ord,
            in_actions,
        }
    }

    #[test]
    fn test_ordering_and_action_menu() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StateRepo::new(&conn);
        repo.add(&state("Done", 1.0, 3, true)).unwrap();
        repo.add(&state("Doing", 0.5, 2, false)).unwrap();
        repo.add(&state("Todo", 0.0, 1, true)).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Todo", "Doing", "Done"]);

        let menu: Vec<_> = repo.in_actions().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(menu, vec!["Todo", "Done"]);
    }

    #[test]
    fn test_rejects_pct_out_of_range() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StateRepo::new(&conn);
        let err = repo.add(&state("Over", 1.5, 0, false)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TaskError>(),
            Some(&TaskError::PctOutOfRange(1.5))
        );
    }

    #[test]
    fn test_delete_clears_task_state() {
        let conn = Db::open_in_memory().unwrap();
        let states = StateRepo::new(&conn);
        let tasks = TaskRepo::new(&conn);
        let done = states.add(&state("Done", 1.0, 0, true)).unwrap();
        let task = tasks.add(&NewTask::new("Leaf")).unwrap();
        tasks.set_state(&[task], Some(done)).unwrap();

        states.delete(done).unwrap();
        assert_eq!(tasks.require(task).unwrap().state_id, None);
    }

    #[test]
    fn test_resolve_by_name() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StateRepo::new(&conn);
        let id = repo.add(&state("Blocked", 0.1, 0, false)).unwrap();
        assert_eq!(repo.resolve("blocked").unwrap().id, id);
        assert_eq!(repo.resolve(&id.to_string()).unwrap().id, id);
        assert!(repo.resolve("nope").is_err());
    }
}
