//! Task Repository: tree rows, subtree flag updates, and lookups.

use crate::engine::error::TaskError;
use crate::engine::types::{NewTask, Task, User};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

pub const TASK_SELECT: &str = "SELECT id, name, icon, description, principal_id, weight, start_date, \
     end_date, state_id, finish_date, parent_id, archived FROM tasks";

/// Selects a task and every descendant under it.
const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
        SELECT ?1
        UNION ALL
        SELECT t.id FROM tasks t INNER JOIN subtree s ON t.parent_id = s.id
    )";

pub struct TaskRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TaskRepo<'a> {
    /// Creates a new repository instance borrowing the connection.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a new task to the database.
    ///
    /// # Errors
    /// Returns an error if validation or the insertion fails.
    pub fn add(&self, task: &NewTask) -> Result<i64> {
        task.validate()?;
        if let Some(parent_id) = task.parent_id {
            self.require(parent_id)?;
        }
        self.conn.execute(
            "INSERT INTO tasks (name, icon, description, principal_id, weight, start_date, end_date, parent_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.name,
                task.icon,
                task.desc,
                task.principal_id,
                task.weight,
                task.start_date,
                task.end_date,
                task.parent_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, name = %task.name, parent = ?task.parent_id, "task added");
        Ok(id)
    }

    /// Writes every field of an existing task back.
    ///
    /// # Errors
    /// Returns an error if validation fails or the task does not exist.
    pub fn update(&self, task: &Task) -> Result<()> {
        task.validate()?;
        let changed = self.conn.execute(
            "UPDATE tasks SET name = ?2, icon = ?3, description = ?4, principal_id = ?5, weight = ?6,
                start_date = ?7, end_date = ?8, state_id = ?9, finish_date = ?10,
                parent_id = ?11, archived = ?12
             WHERE id = ?1",
            params![
                task.id,
                task.name,
                task.icon,
                task.desc,
                task.principal_id,
                task.weight,
                task.start_date,
                task.end_date,
                task.state_id,
                task.finish_date,
                task.parent_id,
                task.archived
            ],
        )?;
        if changed == 0 {
            return Err(TaskError::TaskNotFound(task.id).into());
        }
        debug!(id = task.id, "task updated");
        Ok(())
    }

    /// Inserts the task under its own id, or overwrites the row with that id.
    ///
    /// # Errors
    /// Returns an error if validation or the write fails.
    pub fn upsert(&self, task: &Task) -> Result<()> {
        if self.find_by_id(task.id)?.is_some() {
            return self.update(task);
        }
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (id, name, icon, description, principal_id, weight, start_date, end_date,
                state_id, finish_date, parent_id, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                task.id,
                task.name,
                task.icon,
                task.desc,
                task.principal_id,
                task.weight,
                task.start_date,
                task.end_date,
                task.state_id,
                task.finish_date,
                task.parent_id,
                task.archived
            ],
        )?;
        debug!(id = task.id, "task inserted with explicit id");
        Ok(())
    }

    /// Retrieves all tasks, archived or not, ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} ORDER BY id");
        self.collect(&sql, [])
    }

    /// Retrieves either the active or the archived view, ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_view(&self, archived: bool) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE archived = ?1 ORDER BY id");
        self.collect(&sql, params![archived])
    }

    /// Finds a task by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], Self::row_to_task)
            .optional()
            .context("Search by ID failed")
    }

    /// Finds tasks whose name matches exactly (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE LOWER(name) = LOWER(?1) ORDER BY id");
        self.collect(&sql, params![name])
    }

    /// Like `find_by_id`, but a missing row is an error.
    ///
    /// # Errors
    /// Returns `TaskError::TaskNotFound` if no such task exists.
    pub fn require(&self, id: i64) -> Result<Task> {
        self.find_by_id(id)?
            .ok_or_else(|| TaskError::TaskNotFound(id).into())
    }

    /// Re-parents a task. Cycle checks belong to the caller (see `TaskTree`).
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub fn set_parent(&self, id: i64, parent_id: Option<i64>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET parent_id = ?2 WHERE id = ?1",
            params![id, parent_id],
        )?;
        if changed == 0 {
            return Err(TaskError::TaskNotFound(id).into());
        }
        info!(id, parent = ?parent_id, "task moved");
        Ok(())
    }

    /// Assigns a state to exactly the given rows.
    ///
    /// # Errors
    /// Returns an error if an update fails.
    pub fn set_state(&self, ids: &[i64], state_id: Option<i64>) -> Result<usize> {
        let mut changed = 0;
        for id in ids {
            changed += self.conn.execute(
                "UPDATE tasks SET state_id = ?2 WHERE id = ?1",
                params![id, state_id],
            )?;
        }
        Ok(changed)
    }

    /// Sets the archived flag on a task and its whole subtree.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub fn set_subtree_archived(&self, root_id: i64, archived: bool) -> Result<usize> {
        let sql = format!(
            "{SUBTREE_CTE} UPDATE tasks SET archived = ?2 WHERE id IN (SELECT id FROM subtree)"
        );
        let changed = self.conn.execute(&sql, params![root_id, archived])?;
        debug!(root_id, archived, changed, "subtree archived flag set");
        Ok(changed)
    }

    /// Every distinct user referenced as a principal, ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn principals(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT u.id, u.full_name, u.phone FROM users u
             INNER JOIN tasks t ON t.principal_id = u.id
             ORDER BY u.id",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(User {
                id: r.get(0)?,
                full_name: r.get(1)?,
                phone: r.get(2)?,
            })
        })?;

        let mut users = Vec::new();
        for u in rows {
            users.push(u?);
        }
        Ok(users)
    }

    fn collect<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Converts a database row (in `TASK_SELECT` order) to a Task.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if data conversion fails.
    pub fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            desc: row.get(3)?,
            principal_id: row.get(4)?,
            weight: row.get(5)?,
            start_date: row.get(6)?,
            end_date: row.get(7)?,
            state_id: row.get(8)?,
            finish_date: row.get(9)?,
            parent_id: row.get(10)?,
            archived: row.get(11)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;

    #[test]
    fn test_add_keeps_parent_and_insertion_order() {
        let conn = Db::open_in_memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let root = repo.add(&NewTask::new("Root")).unwrap();
        let b = repo.add(&NewTask::new("B").under(root)).unwrap();
        let a = repo.add(&NewTask::new("A").under(root)).unwrap();

        let ids: Vec<_> = repo
            .get_all()
            .unwrap()
            .iter()
            .filter(|t| t.parent_id == Some(root))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_add_rejects_missing_parent() {
        let conn = Db::open_in_memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let err = repo.add(&NewTask::new("Orphan").under(99)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TaskError>(),
            Some(&TaskError::TaskNotFound(99))
        );
    }

    #[test]
    fn test_subtree_archive_leaves_siblings() {
        let conn = Db::open_in_memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let root = repo.add(&NewTask::new("Root")).unwrap();
        let a = repo.add(&NewTask::new("A").under(root)).unwrap();
        let a1 = repo.add(&NewTask::new("A1").under(a)).unwrap();
        let b = repo.add(&NewTask::new("B").under(root)).unwrap();

        assert_eq!(repo.set_subtree_archived(a, true).unwrap(), 2);
        assert!(repo.require(a1).unwrap().archived);
        assert!(!repo.require(b).unwrap().archived);
        assert!(!repo.require(root).unwrap().archived);
        assert_eq!(repo.get_view(true).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_parent_cascades() {
        let conn = Db::open_in_memory().unwrap();
        let repo = TaskRepo::new(&conn);
        let root = repo.add(&NewTask::new("Root")).unwrap();
        repo.add(&NewTask::new("A").under(root)).unwrap();
        conn.execute("DELETE FROM tasks WHERE id = ?1", params![root])
            .unwrap();
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let conn = Db::open_in_memory().unwrap();
        let repo = TaskRepo::new(&conn);
        repo.add(&NewTask::new("Write Docs")).unwrap();
        assert_eq!(repo.find_by_name("write docs").unwrap().len(), 1);
    }
}
