//! Tree Engine: in-memory parent/child structure of all tasks.
//!
//! Edges run parent -> child. Archived and active tasks share one tree;
//! views filter afterwards.

use super::repo::{StateRepo, TaskRepo};
use super::types::{State, Task};
use anyhow::Result;
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::debug;

pub struct TaskTree {
    graph: DiGraphMap<i64, ()>,
    tasks: HashMap<i64, Task>,
    states: HashMap<i64, State>,
}

impl TaskTree {
    /// Loads every task and state from the database.
    ///
    /// # Errors
    /// Returns an error if a database query fails.
    pub fn build(conn: &Connection) -> Result<Self> {
        let tasks = TaskRepo::new(conn).get_all()?;
        let states = StateRepo::new(conn).get_all()?;
        debug!(tasks = tasks.len(), states = states.len(), "tree loaded");
        Ok(Self::from_parts(tasks, states))
    }

    #[must_use]
    pub fn from_parts(tasks: Vec<Task>, states: Vec<State>) -> Self {
        let mut graph = DiGraphMap::new();
        for t in &tasks {
            graph.add_node(t.id);
        }
        for t in &tasks {
            if let Some(parent) = t.parent_id {
                if graph.contains_node(parent) {
                    graph.add_edge(parent, t.id, ());
                }
            }
        }

        Self {
            graph,
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            states: states.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// The state assigned to a task, if any.
    #[must_use]
    pub fn state_of(&self, task: &Task) -> Option<&State> {
        task.state_id.and_then(|id| self.states.get(&id))
    }

    /// Direct children, ordered by id.
    #[must_use]
    pub fn children(&self, id: i64) -> Vec<&Task> {
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .filter_map(|c| self.tasks.get(&c))
            .collect();
        children.sort_by_key(|t| t.id);
        children
    }

    #[must_use]
    pub fn is_leaf(&self, id: i64) -> bool {
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .next()
            .is_none()
    }

    /// Tasks without a parent, ordered by id.
    #[must_use]
    pub fn roots(&self) -> Vec<&Task> {
        let mut roots: Vec<_> = self
            .tasks
            .values()
            .filter(|t| {
                self.graph
                    .neighbors_directed(t.id, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();
        roots.sort_by_key(|t| t.id);
        roots
    }

    /// Ids of the parent chain, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: i64) -> Vec<i64> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(parent) = self
            .graph
            .neighbors_directed(current, Direction::Incoming)
            .next()
        {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Ids of `id` plus descendants down to `level` levels.
    ///
    /// `0` keeps the task alone; a negative level has no depth bound.
    #[must_use]
    pub fn expand(&self, id: i64, level: i64) -> Vec<i64> {
        if !self.tasks.contains_key(&id) {
            return Vec::new();
        }
        let mut out = vec![id];
        let limit = usize::try_from(level).ok();
        if limit != Some(0) {
            self.collect_down(id, limit, &mut out);
        }
        out
    }

    fn collect_down(&self, id: i64, remaining: Option<usize>, out: &mut Vec<i64>) {
        for child in self.children(id) {
            out.push(child.id);
            match remaining {
                Some(1) => {}
                Some(n) => self.collect_down(child.id, Some(n - 1), out),
                None => self.collect_down(child.id, None, out),
            }
        }
    }

    /// Depth-first walk over the whole forest, siblings by id.
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &Task)> {
        let mut out = Vec::with_capacity(self.tasks.len());
        for root in self.roots() {
            self.walk_from(root, 0, &mut out);
        }
        out
    }

    fn walk_from<'t>(&'t self, task: &'t Task, depth: usize, out: &mut Vec<(usize, &'t Task)>) {
        out.push((depth, task));
        for child in self.children(task.id) {
            self.walk_from(child, depth + 1, out);
        }
    }

    /// Detects if placing `task` under `new_parent` would create a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, task: i64, new_parent: i64) -> bool {
        task == new_parent || has_path_connecting(&self.graph, task, new_parent, None)
    }

    /// True if parent references loop. Only imports can produce this.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn task(id: i64, parent: Option<i64>) -> Task {
        Task {
            id,
            name: format!("task-{id}"),
            icon: "📦".to_string(),
            desc: None,
            principal_id: None,
            weight: 1,
            start_date: None,
            end_date: None,
            state_id: None,
            finish_date: None,
            parent_id: parent,
            archived: false,
        }
    }

    /// 1 ─┬─ 2 ─── 4 ─── 6
    ///    └─ 3 ─── 5
    /// 7
    fn sample() -> TaskTree {
        TaskTree::from_parts(
            vec![
                task(1, None),
                task(2, Some(1)),
                task(3, Some(1)),
                task(4, Some(2)),
                task(5, Some(3)),
                task(6, Some(4)),
                task(7, None),
            ],
            vec![],
        )
    }

    #[test]
    fn test_children_and_roots_sorted() {
        let tree = sample();
        let kids: Vec<_> = tree.children(1).iter().map(|t| t.id).collect();
        assert_eq!(kids, vec![2, 3]);
        let roots: Vec<_> = tree.roots().iter().map(|t| t.id).collect();
        assert_eq!(roots, vec![1, 7]);
        assert!(tree.is_leaf(6));
        assert!(!tree.is_leaf(4));
    }

    #[test]
    fn test_expand_levels() {
        let tree = sample();
        assert_eq!(tree.expand(1, 0), vec![1]);
        assert_eq!(tree.expand(1, 1), vec![1, 2, 3]);
        assert_eq!(tree.expand(1, 2), vec![1, 2, 4, 3, 5]);
        assert_eq!(tree.expand(1, -1), vec![1, 2, 4, 6, 3, 5]);
        assert_eq!(tree.expand(1, 100), tree.expand(1, -1));
        assert!(tree.expand(99, 3).is_empty());
    }

    #[test]
    fn test_ancestors() {
        let tree = sample();
        assert_eq!(tree.ancestors(6), vec![4, 2, 1]);
        assert!(tree.ancestors(7).is_empty());
    }

    #[test]
    fn test_walk_order() {
        let tree = sample();
        let order: Vec<_> = tree.walk().iter().map(|(d, t)| (*d, t.id)).collect();
        assert_eq!(
            order,
            vec![(0, 1), (1, 2), (2, 4), (3, 6), (1, 3), (2, 5), (0, 7)]
        );
    }

    #[test]
    fn test_cycle_detection() {
        let tree = sample();
        assert!(tree.would_create_cycle(2, 6));
        assert!(tree.would_create_cycle(2, 2));
        assert!(!tree.would_create_cycle(2, 3));
        assert!(!tree.would_create_cycle(6, 7));
        assert!(!tree.has_cycle());

        let looped = TaskTree::from_parts(vec![task(1, Some(2)), task(2, Some(1))], vec![]);
        assert!(looped.has_cycle());
    }
}
