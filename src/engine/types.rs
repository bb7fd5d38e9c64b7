//! Core types for the task tracker.
//!
//! Computed values (completeness, timeline) live in `progress.rs`;
//! everything here is stored in SQLite as-is.

use super::error::{TaskError, TaskResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Icons a task may carry.
pub const TASK_ICONS: [&str; 12] = [
    "📦", "💼", "📒", "📌", "🎁", "💻", "🎈", "🔖", "🗳", "🔔", "🪛", "🚀",
];

pub const DEFAULT_ICON: &str = "📦";

pub const WEIGHT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;
pub const LEVEL_RANGE: std::ops::RangeInclusive<i64> = -1..=100;

/// Checks a sibling weight against the allowed range.
///
/// # Errors
/// Returns `TaskError::WeightOutOfRange` outside `1..=100`.
pub fn validate_weight(weight: i64) -> TaskResult<i64> {
    if WEIGHT_RANGE.contains(&weight) {
        Ok(weight)
    } else {
        Err(TaskError::WeightOutOfRange(weight))
    }
}

/// Checks a catalog expansion depth against the allowed range.
///
/// # Errors
/// Returns `TaskError::LevelOutOfRange` outside `-1..=100`.
pub fn validate_level(level: i64) -> TaskResult<i64> {
    if LEVEL_RANGE.contains(&level) {
        Ok(level)
    } else {
        Err(TaskError::LevelOutOfRange(level))
    }
}

/// Checks a completion fraction.
///
/// # Errors
/// Returns `TaskError::PctOutOfRange` outside `0.0..=1.0` (NaN included).
pub fn validate_pct(pct: f64) -> TaskResult<f64> {
    if (0.0..=1.0).contains(&pct) {
        Ok(pct)
    } else {
        Err(TaskError::PctOutOfRange(pct))
    }
}

/// # Errors
/// Returns `TaskError::InvalidIcon` for icons outside [`TASK_ICONS`].
pub fn validate_icon(icon: &str) -> TaskResult<()> {
    if TASK_ICONS.contains(&icon) {
        Ok(())
    } else {
        Err(TaskError::InvalidIcon(icon.to_string()))
    }
}

fn validate_name(name: &str) -> TaskResult<()> {
    if name.trim().is_empty() {
        Err(TaskError::EmptyName)
    } else {
        Ok(())
    }
}

/// A named status label carrying a completion fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub icon: String,
    pub name: String,
    /// Completion fraction in `[0, 1]`.
    pub pct: f64,
    pub ord: i64,
    /// Whether the state is offered in the bulk-action menu.
    pub in_actions: bool,
}

impl State {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> TaskResult<()> {
        validate_name(&self.name)?;
        validate_pct(self.pct)?;
        Ok(())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon, self.name)
    }
}

/// A person who can be responsible for tasks and own catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

/// A node of the task tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub desc: Option<String>,
    pub principal_id: Option<i64>,
    /// Contribution to the parent's completeness, relative to siblings.
    pub weight: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub state_id: Option<i64>,
    pub finish_date: Option<NaiveDate>,
    pub parent_id: Option<i64>,
    pub archived: bool,
}

impl Task {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> TaskResult<()> {
        validate_name(&self.name)?;
        validate_icon(&self.icon)?;
        validate_weight(self.weight)?;
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]. {}", self.icon, self.id, self.name)
    }
}

/// Fields for creating a task. Unset fields take their column defaults.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub icon: String,
    pub desc: Option<String>,
    pub principal_id: Option<i64>,
    pub weight: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub parent_id: Option<i64>,
}

impl NewTask {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: DEFAULT_ICON.to_string(),
            desc: None,
            principal_id: None,
            weight: 1,
            start_date: None,
            end_date: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn weighted(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> TaskResult<()> {
        validate_name(&self.name)?;
        validate_icon(&self.icon)?;
        validate_weight(self.weight)?;
        Ok(())
    }
}

/// A user-owned workspace: a saved set of subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub id: i64,
    pub name: String,
    pub ord: i64,
    pub owner_id: Option<i64>,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One subtree of a catalog: a task and how many levels below it to include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub id: i64,
    pub catalog_id: i64,
    pub task_id: i64,
    /// `0` is the task alone, `n` adds `n` levels, negative adds the whole subtree.
    pub level: i64,
}

impl CatalogItem {
    /// Item label given its task's name, e.g. `Release(2)`.
    #[must_use]
    pub fn label(&self, task_name: &str) -> String {
        format!("{task_name}({})", self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_bounds() {
        assert!(validate_weight(1).is_ok());
        assert!(validate_weight(100).is_ok());
        assert_eq!(validate_weight(0), Err(TaskError::WeightOutOfRange(0)));
        assert_eq!(validate_weight(101), Err(TaskError::WeightOutOfRange(101)));
    }

    #[test]
    fn test_level_bounds() {
        assert!(validate_level(-1).is_ok());
        assert!(validate_level(100).is_ok());
        assert!(validate_level(-2).is_err());
        assert!(validate_level(101).is_err());
    }

    #[test]
    fn test_pct_bounds() {
        assert!(validate_pct(0.0).is_ok());
        assert!(validate_pct(1.0).is_ok());
        assert!(validate_pct(1.01).is_err());
        assert!(validate_pct(-0.1).is_err());
        assert!(validate_pct(f64::NAN).is_err());
    }

    #[test]
    fn test_new_task_defaults_validate() {
        let draft = NewTask::new("Release");
        assert_eq!(draft.icon, DEFAULT_ICON);
        assert_eq!(draft.weight, 1);
        assert!(draft.validate().is_ok());

        let bad = NewTask {
            icon: "🦀".to_string(),
            ..NewTask::new("Release")
        };
        assert_eq!(bad.validate(), Err(TaskError::InvalidIcon("🦀".to_string())));
    }

    #[test]
    fn test_display_formats() {
        let state = State {
            id: 1,
            icon: "✅".to_string(),
            name: "Done".to_string(),
            pct: 1.0,
            ord: 0,
            in_actions: true,
        };
        assert_eq!(state.to_string(), "✅ Done");

        let task = Task {
            id: 7,
            name: "Ship it".to_string(),
            icon: "🚀".to_string(),
            desc: None,
            principal_id: None,
            weight: 1,
            start_date: None,
            end_date: None,
            state_id: None,
            finish_date: None,
            parent_id: None,
            archived: false,
        };
        assert_eq!(task.to_string(), "🚀 [7]. Ship it");
    }

    #[test]
    fn test_catalog_item_label() {
        let item = |level| CatalogItem {
            id: 1,
            catalog_id: 1,
            task_id: 7,
            level,
        };
        assert_eq!(item(2).label("Ship it"), "Ship it(2)");
        assert_eq!(item(0).label("Ship it"), "Ship it(0)");
        assert_eq!(item(-1).label("Ship it"), "Ship it(-1)");
    }
}
