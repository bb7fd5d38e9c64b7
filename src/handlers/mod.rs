//! Command handlers, one module per command group.

pub mod add;
pub mod bulk;
pub mod catalogs;
pub mod edit;
pub mod filters;
pub mod init;
pub mod list;
pub mod move_task;
pub mod show;
pub mod states;
pub mod transfer;
pub mod users;

use anyhow::{bail, Result};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use std::collections::HashMap;
use taskmgr::engine::config::Config;
use taskmgr::engine::repo::UserRepo;
use taskmgr::engine::types::User;

/// Resolves `--user` / `TASKMGR_USER`, if given.
fn acting_user(conn: &Connection, config: &Config) -> Result<Option<User>> {
    config
        .user
        .as_deref()
        .map(|u| UserRepo::new(conn).resolve(u))
        .transpose()
}

/// Like `acting_user`, but the command cannot run without one.
fn require_user(conn: &Connection, config: &Config) -> Result<User> {
    let Some(user) = acting_user(conn, config)? else {
        bail!("This command needs an acting user. Pass --user or set TASKMGR_USER.");
    };
    Ok(user)
}

fn users_by_id(conn: &Connection) -> Result<HashMap<i64, User>> {
    Ok(UserRepo::new(conn)
        .get_all()?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
