//! Bulk Actions: operations applied to a selection of tasks.
//!
//! `Mark` touches exactly the selected rows. `Archive` and `Restore` flip
//! the flag on each selected row and its entire subtree.

use super::error::TaskError;
use super::repo::{StateRepo, TaskRepo};
use super::types::State;
use anyhow::Result;
use rusqlite::Connection;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum BulkAction {
    Mark(State),
    Archive,
    Restore,
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mark(state) => write!(f, "Mark as {}{}", state.icon, state.name),
            Self::Archive => write!(f, "Archive 🗜"),
            Self::Restore => write!(f, "Restore 🗃"),
        }
    }
}

/// The action menu of a view.
///
/// The active view offers one mark action per menu state plus archive;
/// the archived view offers restore only.
///
/// # Errors
/// Returns an error if the states query fails.
pub fn available(conn: &Connection, archived_view: bool) -> Result<Vec<BulkAction>> {
    if archived_view {
        return Ok(vec![BulkAction::Restore]);
    }
    let mut actions: Vec<_> = StateRepo::new(conn)
        .in_actions()?
        .into_iter()
        .map(BulkAction::Mark)
        .collect();
    actions.push(BulkAction::Archive);
    Ok(actions)
}

/// Builds a mark action, refusing states outside the action menu.
///
/// # Errors
/// Returns `TaskError::StateNotInActions` for such states.
pub fn mark_with(state: State) -> Result<BulkAction> {
    if !state.in_actions {
        return Err(TaskError::StateNotInActions(state.name).into());
    }
    Ok(BulkAction::Mark(state))
}

impl BulkAction {
    /// Whether the action belongs to the archived view's menu.
    #[must_use]
    pub fn for_archived(&self) -> bool {
        matches!(self, Self::Restore)
    }
}

/// Runs an action over the selection and returns the number of rows changed.
///
/// Every selected task must be in the view that offers the action: mark and
/// archive take active tasks, restore takes archived ones.
/// The caller owns the transaction.
///
/// # Errors
/// Returns `TaskError::TaskNotFound` or `TaskError::WrongView` for a bad
/// selection, or an error if an update fails.
pub fn apply(conn: &Connection, action: &BulkAction, ids: &[i64]) -> Result<usize> {
    let repo = TaskRepo::new(conn);
    for id in ids {
        let task = repo.require(*id)?;
        if task.archived != action.for_archived() {
            let view = if task.archived { "archived" } else { "active" };
            return Err(TaskError::WrongView {
                task: task.id,
                view,
                action: action.to_string(),
            }
            .into());
        }
    }

    let changed = match action {
        BulkAction::Mark(state) => repo.set_state(ids, Some(state.id))?,
        BulkAction::Archive => set_archived(&repo, ids, true)?,
        BulkAction::Restore => set_archived(&repo, ids, false)?,
    };
    info!(action = %action, selected = ids.len(), changed, "bulk action applied");
    Ok(changed)
}

fn set_archived(repo: &TaskRepo<'_>, ids: &[i64], archived: bool) -> Result<usize> {
    let mut changed = 0;
    for id in ids {
        changed += repo.set_subtree_archived(*id, archived)?;
    }
    Ok(changed)
}
