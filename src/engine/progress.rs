//! Derived Progress: completeness roll-up and timeline position.
//!
//! Nothing here is stored. Completeness is recomputed from the tree on
//! every call; timeline is a pure function of two dates and "now".

use super::error::{TaskError, TaskResult};
use super::tree::TaskTree;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Completion fraction of a task.
///
/// A leaf reports its state's `pct` (0 without a state); an internal node
/// reports the weight-normalised average of its children.
///
/// # Errors
/// Returns `TaskError::TaskNotFound` for an unknown id, or
/// `TaskError::ZeroWeight` when an internal node's children weigh nothing.
pub fn completeness(tree: &TaskTree, id: i64) -> TaskResult<f64> {
    let task = tree.get(id).ok_or(TaskError::TaskNotFound(id))?;
    let children = tree.children(id);

    if children.is_empty() {
        return Ok(tree.state_of(task).map_or(0.0, |s| s.pct));
    }

    let total_weight: i64 = children.iter().map(|c| c.weight).sum();
    if total_weight == 0 {
        return Err(TaskError::ZeroWeight(id));
    }

    let mut weighted = 0.0;
    for child in children {
        weighted += completeness(tree, child.id)? * weight_of(child.weight);
    }
    Ok(weighted / weight_of(total_weight))
}

#[allow(clippy::cast_precision_loss)]
fn weight_of(weight: i64) -> f64 {
    weight as f64
}

/// Fraction of the scheduled window that has elapsed at `now`.
///
/// The window runs from `start` 00:00:00 to `end` 23:59:59. `now` is
/// clamped to the end of the window but not to its start, so the result
/// is negative before the task begins. `None` when either date is missing.
#[must_use]
pub fn timeline(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Option<f64> {
    let (start, end) = (start?, end?);
    let start = start.and_time(NaiveTime::MIN);
    let end = end.and_hms_opt(23, 59, 59)?;

    let now = now.min(end);
    let elapsed = (now - start).num_milliseconds();
    let span = (end - start).num_milliseconds();

    #[allow(clippy::cast_precision_loss)]
    let fraction = elapsed as f64 / span as f64;
    Some(fraction)
}

/// Renders a fraction as a whole percentage, e.g. `0.5` -> `"50%"`.
#[must_use]
pub fn format_pct(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Timeline column text: a percentage, or `-` when undefined.
#[must_use]
pub fn format_timeline(fraction: Option<f64>) -> String {
    fraction.map_or_else(|| "-".to_string(), format_pct)
}

/// State column text.
///
/// Leaves show their state label (`-` without one). Internal nodes show a
/// medal once fully complete and `...` before that.
///
/// # Errors
/// Propagates completeness errors for internal nodes.
pub fn state_label(tree: &TaskTree, id: i64) -> TaskResult<String> {
    let task = tree.get(id).ok_or(TaskError::TaskNotFound(id))?;
    if tree.is_leaf(id) {
        return Ok(tree
            .state_of(task)
            .map_or_else(|| "-".to_string(), ToString::to_string));
    }
    #[allow(clippy::float_cmp)]
    let done = completeness(tree, id)? == 1.0;
    Ok(if done { "🏅" } else { "..." }.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tree::tests::task;
    use crate::engine::types::{State, Task};

    fn state(id: i64, pct: f64) -> State {
        State {
            id,
            icon: "●".to_string(),
            name: format!("s{id}"),
            pct,
            ord: 0,
            in_actions: true,
        }
    }

    fn with(mut t: Task, weight: i64, state_id: Option<i64>) -> Task {
        t.weight = weight;
        t.state_id = state_id;
        t
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_leaf_uses_state_pct() {
        let tree = TaskTree::from_parts(
            vec![with(task(1, None), 1, Some(10)), task(2, None)],
            vec![state(10, 0.4)],
        );
        assert!((completeness(&tree, 1).unwrap() - 0.4).abs() < 1e-9);
        assert_eq!(completeness(&tree, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_weighted_average_recurses() {
        // 1 has children 2 (w=3, done) and 3 (w=1, internal).
        // 3 has children 4 (w=1, half) and 5 (w=1, no state).
        let tree = TaskTree::from_parts(
            vec![
                task(1, None),
                with(task(2, Some(1)), 3, Some(10)),
                with(task(3, Some(1)), 1, None),
                with(task(4, Some(3)), 1, Some(11)),
                with(task(5, Some(3)), 1, None),
            ],
            vec![state(10, 1.0), state(11, 0.5)],
        );
        assert!((completeness(&tree, 3).unwrap() - 0.25).abs() < 1e-9);
        // (1.0 * 3 + 0.25 * 1) / 4
        assert!((completeness(&tree, 1).unwrap() - 0.8125).abs() < 1e-9);
    }

    #[test]
    fn test_internal_node_ignores_own_state() {
        let tree = TaskTree::from_parts(
            vec![with(task(1, None), 1, Some(10)), task(2, Some(1))],
            vec![state(10, 1.0)],
        );
        assert_eq!(completeness(&tree, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_weight_is_an_error() {
        let tree = TaskTree::from_parts(
            vec![task(1, None), with(task(2, Some(1)), 0, None)],
            vec![],
        );
        assert_eq!(completeness(&tree, 1), Err(TaskError::ZeroWeight(1)));
    }

    #[test]
    fn test_timeline_undefined_without_both_dates() {
        let now = at(2024, 1, 5, 12);
        assert_eq!(timeline(None, Some(date(2024, 1, 10)), now), None);
        assert_eq!(timeline(Some(date(2024, 1, 1)), None, now), None);
    }

    #[test]
    fn test_timeline_midpoint_and_clamp() {
        let start = Some(date(2024, 1, 1));
        let end = Some(date(2024, 1, 2));
        // Window is 47:59:59 long; noon on day 2 is 36h in.
        let mid = timeline(start, end, at(2024, 1, 2, 12)).unwrap();
        assert!((mid - 36.0 * 3600.0 / 172_799.0).abs() < 1e-9);

        let after = timeline(start, end, at(2024, 3, 1, 0)).unwrap();
        assert!((after - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_timeline_negative_before_start() {
        let value = timeline(
            Some(date(2024, 1, 10)),
            Some(date(2024, 1, 10)),
            at(2024, 1, 9, 0),
        )
        .unwrap();
        assert!(value < -0.99);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_pct(0.5), "50%");
        assert_eq!(format_pct(1.0), "100%");
        assert_eq!(format_pct(0.8125), "81%");
        assert_eq!(format_timeline(None), "-");
    }

    #[test]
    fn test_state_labels() {
        let tree = TaskTree::from_parts(
            vec![
                task(1, None),
                with(task(2, Some(1)), 1, Some(10)),
                task(3, None),
                with(task(4, Some(3)), 1, Some(11)),
                task(5, None),
            ],
            vec![state(10, 1.0), state(11, 0.2)],
        );
        assert_eq!(state_label(&tree, 1).unwrap(), "🏅");
        assert_eq!(state_label(&tree, 2).unwrap(), "● s10");
        assert_eq!(state_label(&tree, 3).unwrap(), "...");
        assert_eq!(state_label(&tree, 5).unwrap(), "-");
    }
}
