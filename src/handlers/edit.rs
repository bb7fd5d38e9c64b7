//! Handler for the `edit` command.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::repo::{TaskRepo, UserRepo};
use taskmgr::engine::resolver::TaskResolver;
use taskmgr::engine::types::Task;

/// Field changes for a task. `None` leaves a field as it is; the `clear_*`
/// flags blank optional fields.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub desc: Option<String>,
    pub clear_desc: bool,
    pub principal: Option<String>,
    pub clear_principal: bool,
    pub weight: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Blanks both start and end dates.
    pub clear_dates: bool,
    pub finish: Option<NaiveDate>,
    pub clear_finish: bool,
}

impl TaskEdit {
    /// Applies every change except the principal, which needs a user lookup.
    fn apply_fields(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name.clone_from(name);
        }
        if let Some(icon) = &self.icon {
            task.icon.clone_from(icon);
        }
        if self.clear_desc {
            task.desc = None;
        } else if self.desc.is_some() {
            task.desc.clone_from(&self.desc);
        }
        if let Some(weight) = self.weight {
            task.weight = weight;
        }
        if self.clear_dates {
            task.start_date = None;
            task.end_date = None;
        } else {
            task.start_date = self.start.or(task.start_date);
            task.end_date = self.end.or(task.end_date);
        }
        task.finish_date = if self.clear_finish {
            None
        } else {
            self.finish.or(task.finish_date)
        };
    }
}

/// Applies field changes to one task.
///
/// # Errors
/// Returns error if the task or principal cannot be resolved or a field is invalid.
pub fn handle(config: &Config, task_ref: &str, edit: &TaskEdit) -> Result<()> {
    let mut conn = Db::connect(config)?;
    let tx = conn.transaction()?;

    let mut task = TaskResolver::new(&tx).resolve(task_ref)?.task;
    edit.apply_fields(&mut task);
    if edit.clear_principal {
        task.principal_id = None;
    } else if let Some(principal) = &edit.principal {
        task.principal_id = Some(UserRepo::new(&tx).resolve(principal)?.id);
    }

    TaskRepo::new(&tx).update(&task)?;
    tx.commit()?;

    println!("{} Updated {task}", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated() -> Task {
        Task {
            id: 1,
            name: "Report".to_string(),
            icon: "📒".to_string(),
            desc: Some("quarterly".to_string()),
            principal_id: Some(3),
            weight: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            state_id: None,
            finish_date: NaiveDate::from_ymd_opt(2024, 3, 29),
            parent_id: None,
            archived: false,
        }
    }

    #[test]
    fn test_empty_edit_keeps_fields() {
        let mut task = dated();
        TaskEdit::default().apply_fields(&mut task);
        assert_eq!(task, dated());
    }

    #[test]
    fn test_clear_flags_blank_optional_fields() {
        let mut task = dated();
        let edit = TaskEdit {
            clear_desc: true,
            clear_dates: true,
            clear_finish: true,
            ..TaskEdit::default()
        };
        edit.apply_fields(&mut task);
        assert_eq!(task.desc, None);
        assert_eq!(task.start_date, None);
        assert_eq!(task.end_date, None);
        assert_eq!(task.finish_date, None);
        assert_eq!(task.principal_id, Some(3));
    }

    #[test]
    fn test_values_replace_fields() {
        let mut task = dated();
        let edit = TaskEdit {
            name: Some("Annual report".to_string()),
            weight: Some(5),
            end: NaiveDate::from_ymd_opt(2024, 4, 15),
            ..TaskEdit::default()
        };
        edit.apply_fields(&mut task);
        assert_eq!(task.name, "Annual report");
        assert_eq!(task.weight, 5);
        assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2024, 4, 15));
    }
}
