//! List Filters: narrowing a view of the task tree.
//!
//! Filters combine; a task is listed only if every active filter keeps it.

use super::tree::TaskTree;
use super::types::{Catalog, CatalogItem, Task, User};
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::debug;

pub const EMPTY_PRINCIPAL_KEY: &str = "none";
pub const EMPTY_PRINCIPAL_LABEL: &str = "<empty>";

/// Whose tasks a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Tasks whose principal is the acting user.
    Me,
    #[default]
    All,
}

impl Scope {
    #[must_use]
    pub fn lookups() -> [(&'static str, &'static str); 2] {
        [("me", "me"), ("all", "all")]
    }
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "me" => Ok(Self::Me),
            "all" => Ok(Self::All),
            other => bail!("Unknown scope '{other}' (expected 'me' or 'all')"),
        }
    }
}

/// A principal filter choice: one user, or "no principal".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalChoice {
    User(i64),
    Empty,
}

impl FromStr for PrincipalChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case(EMPTY_PRINCIPAL_KEY) {
            return Ok(Self::Empty);
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(Self::User(id)),
            Err(_) => bail!("Principal must be a user id or '{EMPTY_PRINCIPAL_KEY}'"),
        }
    }
}

/// Choices for the principal filter: every user that is principal of at
/// least one task, then the "no principal" entry.
#[must_use]
pub fn principal_lookups(principals: &[User]) -> Vec<(String, String)> {
    principals
        .iter()
        .map(|u| (u.id.to_string(), u.to_string()))
        .chain(std::iter::once((
            EMPTY_PRINCIPAL_KEY.to_string(),
            EMPTY_PRINCIPAL_LABEL.to_string(),
        )))
        .collect()
}

/// Choices for the catalog filter: the acting user's catalogs.
#[must_use]
pub fn catalog_lookups(catalogs: &[Catalog]) -> Vec<(String, String)> {
    catalogs
        .iter()
        .map(|c| (c.id.to_string(), c.name.clone()))
        .collect()
}

/// Union of every item's subtree expansion.
#[must_use]
pub fn catalog_task_ids(tree: &TaskTree, items: &[CatalogItem]) -> HashSet<i64> {
    let ids: HashSet<i64> = items
        .iter()
        .flat_map(|item| tree.expand(item.task_id, item.level))
        .collect();
    debug!(items = items.len(), tasks = ids.len(), "catalog expanded");
    ids
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Show the archived view instead of the active one.
    pub archived: bool,
    /// Acting user id when the scope is `me`.
    pub me: Option<i64>,
    pub principal: Option<PrincipalChoice>,
    pub catalog: Option<HashSet<i64>>,
    /// Lowercased search terms; every term must hit some searched field.
    pub search: Vec<String>,
}

impl TaskFilter {
    #[must_use]
    pub fn active() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn archived() -> Self {
        Self {
            archived: true,
            ..Self::default()
        }
    }

    /// Applies a scope; `me` needs the acting user.
    ///
    /// # Errors
    /// Returns an error for scope `me` without an acting user.
    pub fn with_scope(mut self, scope: Scope, acting_user: Option<i64>) -> Result<Self> {
        if scope == Scope::Me {
            let Some(id) = acting_user else {
                bail!("Scope 'me' needs an acting user (--user or TASKMGR_USER)");
            };
            self.me = Some(id);
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_principal(mut self, choice: PrincipalChoice) -> Self {
        self.principal = Some(choice);
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, ids: HashSet<i64>) -> Self {
        self.catalog = Some(ids);
        self
    }

    #[must_use]
    pub fn with_search(mut self, query: &str) -> Self {
        self.search = query.split_whitespace().map(str::to_lowercase).collect();
        self
    }

    /// Whether a single task passes every filter.
    #[must_use]
    pub fn matches(&self, task: &Task, users: &HashMap<i64, User>) -> bool {
        if task.archived != self.archived {
            return false;
        }
        if let Some(me) = self.me {
            if task.principal_id != Some(me) {
                return false;
            }
        }
        match self.principal {
            Some(PrincipalChoice::User(id)) if task.principal_id != Some(id) => return false,
            Some(PrincipalChoice::Empty) if task.principal_id.is_some() => return false,
            _ => {}
        }
        if let Some(ids) = &self.catalog {
            if !ids.contains(&task.id) {
                return false;
            }
        }
        if !self.search.is_empty() {
            let principal = task.principal_id.and_then(|id| users.get(&id));
            if !self.search.iter().all(|term| search_hits(task, principal, term)) {
                return false;
            }
        }
        true
    }

    /// Matching tasks in tree order, with their true depth.
    #[must_use]
    pub fn apply<'t>(
        &self,
        tree: &'t TaskTree,
        users: &HashMap<i64, User>,
    ) -> Vec<(usize, &'t Task)> {
        tree.walk()
            .into_iter()
            .filter(|(_, t)| self.matches(t, users))
            .collect()
    }
}

fn search_hits(task: &Task, principal: Option<&User>, term: &str) -> bool {
    if task.name.to_lowercase().contains(term) {
        return true;
    }
    principal.is_some_and(|u| {
        u.full_name.to_lowercase().contains(term)
            || u.phone
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(term))
    })
}
