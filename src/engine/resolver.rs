//! Fuzzy Task Resolver: Matches human queries to tasks.

use super::repo::TaskRepo;
use super::types::Task;
use anyhow::{bail, Result};
use rusqlite::Connection;
use std::collections::HashSet;

pub struct ResolveResult {
    pub task: Task,
    pub confidence: f64,
}

pub struct TaskResolver<'a> {
    repo: TaskRepo<'a>,
    strict: bool,
}

impl<'a> TaskResolver<'a> {
    /// Creates a new resolver.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            repo: TaskRepo::new(conn),
            strict: false,
        }
    }

    /// Creates a resolver that only accepts ids and exact names.
    #[must_use]
    pub fn strict(conn: &'a Connection) -> Self {
        Self {
            repo: TaskRepo::new(conn),
            strict: true,
        }
    }

    /// Resolves a user query into a task: id, then exact name, then fuzzy name.
    ///
    /// # Errors
    /// Returns an error if no match is found or the exact name is ambiguous.
    pub fn resolve(&self, query: &str) -> Result<ResolveResult> {
        if let Ok(id) = query.parse::<i64>() {
            if let Some(task) = self.repo.find_by_id(id)? {
                return Ok(ResolveResult {
                    task,
                    confidence: 1.0,
                });
            }
        }

        let mut exact = self.repo.find_by_name(query)?;
        match exact.len() {
            0 => {}
            1 => {
                return Ok(ResolveResult {
                    task: exact.remove(0),
                    confidence: 1.0,
                })
            }
            n => {
                let ids: Vec<_> = exact.iter().map(|t| t.id.to_string()).collect();
                bail!("'{query}' names {n} tasks ({}); use the id", ids.join(", "));
            }
        }

        if self.strict {
            bail!("No exact match for '{query}' in strict mode.");
        }
        self.fuzzy_resolve(query)
    }

    /// Resolves several queries, keeping their order.
    ///
    /// # Errors
    /// Returns the first resolution failure.
    pub fn resolve_all(&self, queries: &[String]) -> Result<Vec<Task>> {
        queries
            .iter()
            .map(|q| self.resolve(q).map(|r| r.task))
            .collect()
    }

    fn fuzzy_resolve(&self, query: &str) -> Result<ResolveResult> {
        let tasks = self.repo.get_all()?;
        let query_lower = query.to_lowercase();
        let words: Vec<_> = query_lower.split_whitespace().collect();

        let mut matches: Vec<_> = tasks
            .into_iter()
            .map(|t| (calculate_score(&t, &query_lower, &words), t))
            .filter(|(s, _)| *s > 0.3)
            .collect();

        matches.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.id.cmp(&b.1.id))
        });

        let (confidence, task) = matches
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No task matches '{query}'"))?;

        Ok(ResolveResult { task, confidence })
    }
}

/// Calculates a match score between a task name and a query.
fn calculate_score(task: &Task, query: &str, query_words: &[&str]) -> f64 {
    let name_lower = task.name.to_lowercase();

    let mut score = 0.0;

    if name_lower.contains(query) {
        score += 0.7;
    }

    for word in query_words {
        if name_lower.contains(word) {
            score += 0.25;
        }
    }

    if name_lower.starts_with(query) {
        score += 0.5;
    }

    score += string_similarity(&name_lower, query) * 0.4;

    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn string_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: HashSet<char> = a.chars().collect();
    let b_chars: HashSet<char> = b.chars().collect();

    let intersection = a_chars.intersection(&b_chars).count();
    let union = a_chars.union(&b_chars).count();

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}
