//! Typed errors for validation and tree operations.
//!
//! Repositories and handlers wrap these in `anyhow` as they bubble up.

use thiserror::Error;

/// Result alias for engine operations that fail with a [`TaskError`].
pub type TaskResult<T> = std::result::Result<T, TaskError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("weight must be between 1 and 100, got {0}")]
    WeightOutOfRange(i64),

    #[error("level must be between -1 and 100, got {0}")]
    LevelOutOfRange(i64),

    #[error("completion must be between 0 and 1, got {0}")]
    PctOutOfRange(f64),

    #[error("unknown task icon '{0}'")]
    InvalidIcon(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("children of task {0} have a total weight of zero")]
    ZeroWeight(i64),

    #[error("moving task {task} under {parent} would create a cycle")]
    Cycle { task: i64, parent: i64 },

    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("state {0} not found")]
    StateNotFound(i64),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("catalog {0} not found")]
    CatalogNotFound(i64),

    #[error("state '{0}' is not offered as a bulk action")]
    StateNotInActions(String),

    #[error("task {task} is {view}; '{action}' is not offered there")]
    WrongView {
        task: i64,
        view: &'static str,
        action: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_values() {
        assert!(TaskError::WeightOutOfRange(0).to_string().contains('0'));
        assert!(TaskError::LevelOutOfRange(-2).to_string().contains("-2"));
        let err = TaskError::Cycle { task: 3, parent: 7 };
        assert_eq!(err.to_string(), "moving task 3 under 7 would create a cycle");
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = TaskError::ZeroWeight(4).into();
        assert!(err.downcast_ref::<TaskError>().is_some());
    }
}
