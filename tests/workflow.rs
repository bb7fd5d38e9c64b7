//! End-to-end flows against an on-disk database.

use chrono::NaiveDate;
use std::collections::HashMap;
use taskmgr::engine::actions::{self, BulkAction};
use taskmgr::engine::config::Config;
use taskmgr::engine::db::Db;
use taskmgr::engine::filters::{catalog_task_ids, PrincipalChoice, TaskFilter};
use taskmgr::engine::progress::{completeness, state_label, timeline};
use taskmgr::engine::repo::{CatalogRepo, StateRepo, TaskRepo, UserRepo};
use taskmgr::engine::transfer::{self, Format};
use taskmgr::engine::tree::TaskTree;
use taskmgr::engine::types::{NewTask, State, User};
use tempfile::TempDir;

fn setup() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let config = Config::new(dir.path().join("nested").join("state.db"), None);
    Db::init(&config).unwrap();
    (dir, config)
}

fn state(name: &str, pct: f64, ord: i64) -> State {
    State {
        id: 0,
        icon: "●".to_string(),
        name: name.to_string(),
        pct,
        ord,
        in_actions: true,
    }
}

fn users(conn: &rusqlite::Connection) -> HashMap<i64, User> {
    UserRepo::new(conn)
        .get_all()
        .unwrap()
        .into_iter()
        .map(|u| (u.id, u))
        .collect()
}

#[test]
fn connect_requires_init() {
    let dir = TempDir::new().unwrap();
    let config = Config::new(dir.path().join("missing.db"), None);
    assert!(Db::connect(&config).is_err());
}

#[test]
fn weighted_rollup_follows_marks() {
    let (_dir, config) = setup();
    let conn = Db::connect(&config).unwrap();

    let states = StateRepo::new(&conn);
    let half = states.add(&state("Half", 0.5, 1)).unwrap();
    let done = states.add(&state("Done", 1.0, 2)).unwrap();

    let repo = TaskRepo::new(&conn);
    let release = repo.add(&NewTask::new("Release")).unwrap();
    let docs = repo.add(&NewTask::new("Docs").under(release)).unwrap();
    let code = repo
        .add(&NewTask::new("Code").under(release).weighted(3))
        .unwrap();

    let tree = TaskTree::build(&conn).unwrap();
    assert!((completeness(&tree, release).unwrap() - 0.0).abs() < 1e-9);
    assert_eq!(state_label(&tree, release).unwrap(), "...");

    let half = states.find_by_id(half).unwrap().unwrap();
    let done = states.find_by_id(done).unwrap().unwrap();
    actions::apply(&conn, &actions::mark_with(half).unwrap(), &[docs]).unwrap();
    actions::apply(&conn, &actions::mark_with(done.clone()).unwrap(), &[code]).unwrap();

    // (0.5 * 1 + 1.0 * 3) / 4
    let tree = TaskTree::build(&conn).unwrap();
    assert!((completeness(&tree, release).unwrap() - 0.875).abs() < 1e-9);

    actions::apply(&conn, &BulkAction::Mark(done), &[docs]).unwrap();
    let tree = TaskTree::build(&conn).unwrap();
    assert!((completeness(&tree, release).unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(state_label(&tree, release).unwrap(), "🏅");
}

#[test]
fn archive_moves_subtree_between_views() {
    let (_dir, config) = setup();
    let conn = Db::connect(&config).unwrap();
    let repo = TaskRepo::new(&conn);
    let root = repo.add(&NewTask::new("Root")).unwrap();
    let child = repo.add(&NewTask::new("Child").under(root)).unwrap();
    let grandchild = repo.add(&NewTask::new("Grandchild").under(child)).unwrap();
    let other = repo.add(&NewTask::new("Other")).unwrap();

    actions::apply(&conn, &BulkAction::Archive, &[child]).unwrap();

    let tree = TaskTree::build(&conn).unwrap();
    let users = users(&conn);
    let active: Vec<i64> = TaskFilter::active()
        .apply(&tree, &users)
        .iter()
        .map(|(_, t)| t.id)
        .collect();
    let archived: Vec<(usize, i64)> = TaskFilter::archived()
        .apply(&tree, &users)
        .iter()
        .map(|(d, t)| (*d, t.id))
        .collect();
    assert_eq!(active, vec![root, other]);
    assert_eq!(archived, vec![(1, child), (2, grandchild)]);

    actions::apply(&conn, &BulkAction::Restore, &[child]).unwrap();
    assert!(repo.get_view(true).unwrap().is_empty());
}

#[test]
fn catalog_and_principal_filters_combine() {
    let (_dir, config) = setup();
    let conn = Db::connect(&config).unwrap();
    let people = UserRepo::new(&conn);
    let ann = people.add("Ann Lee", Some("+1 555 0100")).unwrap();
    let bob = people.add("Bob Stone", None).unwrap();

    let repo = TaskRepo::new(&conn);
    let mut plan = NewTask::new("Plan");
    plan.principal_id = Some(ann);
    let plan = repo.add(&plan).unwrap();
    let mut draft = NewTask::new("Draft").under(plan);
    draft.principal_id = Some(bob);
    let draft = repo.add(&draft).unwrap();
    let review = repo.add(&NewTask::new("Review").under(draft)).unwrap();
    repo.add(&NewTask::new("Unrelated")).unwrap();

    let catalogs = CatalogRepo::new(&conn, ann);
    let workspace = catalogs.add("Workspace", 0).unwrap();
    catalogs.add_item(workspace, plan, 1).unwrap();
    assert!(CatalogRepo::new(&conn, bob).items(workspace).is_err());

    let tree = TaskTree::build(&conn).unwrap();
    let users = users(&conn);
    let scope = catalog_task_ids(&tree, &catalogs.items(workspace).unwrap());
    assert!(scope.contains(&draft) && !scope.contains(&review));

    let ids = |filter: TaskFilter| -> Vec<i64> {
        filter.apply(&tree, &users).iter().map(|(_, t)| t.id).collect()
    };
    assert_eq!(ids(TaskFilter::active().with_catalog(scope.clone())), vec![plan, draft]);
    assert_eq!(
        ids(TaskFilter::active()
            .with_catalog(scope)
            .with_principal(PrincipalChoice::User(bob))),
        vec![draft]
    );
    assert_eq!(ids(TaskFilter::active().with_search("0100")), vec![plan]);
    assert_eq!(
        ids(TaskFilter::active().with_principal(PrincipalChoice::Empty)).len(),
        2
    );
}

#[test]
fn export_then_import_into_fresh_database() {
    let (_dir, config) = setup();
    let conn = Db::connect(&config).unwrap();
    let repo = TaskRepo::new(&conn);
    let mut parent = NewTask::new("Parent");
    parent.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
    parent.end_date = NaiveDate::from_ymd_opt(2024, 1, 10);
    let parent = repo.add(&parent).unwrap();
    repo.add(&NewTask::new("Child").under(parent).weighted(7))
        .unwrap();

    let mut buf = Vec::new();
    transfer::export(&repo.get_all().unwrap(), Format::Json, &mut buf).unwrap();

    let (_other_dir, other) = setup();
    let mut target = Db::connect(&other).unwrap();
    let records = transfer::read(buf.as_slice(), Format::Json).unwrap();
    let summary = transfer::import(&mut target, &records).unwrap();
    assert_eq!(summary.created, 2);

    let copied = TaskRepo::new(&target).get_all().unwrap();
    assert_eq!(copied, repo.get_all().unwrap());

    let start = copied[0].start_date;
    let end = copied[0].end_date;
    let midway = NaiveDate::from_ymd_opt(2024, 1, 5)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap();
    assert!((timeline(start, end, midway).unwrap() - 0.5).abs() < 1e-6);
}
