//! Runtime configuration: where the database lives and who is acting.

use std::path::{Path, PathBuf};

pub const DB_ENV: &str = "TASKMGR_DB";
pub const USER_ENV: &str = "TASKMGR_USER";
pub const DEFAULT_DB_DIR: &str = ".taskmgr";
pub const DEFAULT_DB_FILE: &str = "state.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Acting user reference (id or full name), resolved against `users`.
    pub user: Option<String>,
}

impl Config {
    #[must_use]
    pub fn new<P: AsRef<Path>>(db_path: P, user: Option<String>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            user,
        }
    }

    /// Reads `TASKMGR_DB` and `TASKMGR_USER`, falling back to the default path.
    #[must_use]
    pub fn from_env() -> Self {
        let db_path = std::env::var(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_db_path());
        let user = std::env::var(USER_ENV).ok().filter(|u| !u.is_empty());
        Self { db_path, user }
    }

    #[must_use]
    pub fn default_db_path() -> PathBuf {
        Path::new(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::default_db_path(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from(".taskmgr/state.db"));
        assert!(config.user.is_none());
    }

    #[test]
    fn test_new_keeps_values() {
        let config = Config::new("/tmp/x.db", Some("alice".to_string()));
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.user.as_deref(), Some("alice"));
    }
}
