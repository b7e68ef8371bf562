//! End-to-end behaviour of the task store and its roll-ups.

use std::io::Write;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tareas::error::StoreError;
use tareas::fields::{Area, NotificationKind, Priority, Status, ViewerContext};
use tareas::kpi::{dashboard, kpis};
use tareas::notify::generate;
use tareas::seed::{builtin_seed, load_seed};
use tareas::status::{days_remaining, status_of, total_progress, FixedClock};
use tareas::store::TaskStore;
use tareas::task::{Activity, Task};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn activity(id: &str, percentage: u8) -> Activity {
    Activity {
        id: id.into(),
        name: format!("Step {id}"),
        percentage,
        completed: percentage == 100,
    }
}

fn task(id: &str, start: &str, end: &str, activities: Vec<Activity>) -> Task {
    Task {
        id: id.into(),
        name: format!("Task {id}"),
        description: String::new(),
        areas: vec![Area::Mantenimiento],
        requires_support: false,
        support_areas: vec![],
        start_date: d(start),
        end_date: d(end),
        execution_days: 0,
        priority: Priority::Medium,
        activities,
        documents: vec![],
        total_progress: 0,
        status: Status::Planned,
        created_by: "Admin".into(),
        created_at: d(start),
    }
}

fn store(today: &str, tasks: Vec<Task>) -> TaskStore {
    TaskStore::new(tasks, ViewerContext::Administrator, Box::new(FixedClock(d(today))))
}

#[test]
fn test_complete_task_is_finished_whatever_the_date() {
    let mut t = task("tarea-1", "2024-03-01", "2024-03-10", vec![activity("a", 100)]);
    t.total_progress = 100;
    for today in ["2024-02-01", "2024-03-05", "2025-01-01"] {
        assert_eq!(status_of(&t, d(today)), Status::Finished);
    }
}

#[test]
fn test_late_partial_task_is_overdue() {
    let s = store(
        "2024-03-15",
        vec![task("tarea-1", "2024-03-01", "2024-03-10", vec![activity("a", 40)])],
    );
    let t = s.get("tarea-1").unwrap();
    assert_eq!(t.total_progress, 40);
    assert_eq!(t.status, Status::Overdue);
    assert_eq!(days_remaining(t.end_date, s.today()), -5);
}

#[test]
fn test_future_task_is_planned() {
    let s = store("2024-03-01", vec![task("tarea-1", "2024-03-05", "2024-03-10", vec![])]);
    assert_eq!(s.get("tarea-1").unwrap().status, Status::Planned);
}

#[test]
fn test_progress_is_rounded_mean_of_activities() {
    let acts = vec![activity("a", 100), activity("b", 50), activity("c", 0)];
    assert_eq!(total_progress(&acts), 50);
}

#[test]
fn test_ticking_last_activity_finishes_the_task() {
    let mut s = store(
        "2024-03-05",
        vec![task(
            "tarea-1",
            "2024-03-01",
            "2024-03-10",
            vec![activity("tarea-1-act-1", 100), activity("tarea-1-act-2", 0)],
        )],
    );
    assert_eq!(s.get("tarea-1").unwrap().status, Status::InProgress);

    s.set_activity_completed("tarea-1", "tarea-1-act-2", true).unwrap();

    let t = s.get("tarea-1").unwrap();
    assert_eq!(t.total_progress, 100);
    assert_eq!(t.status, Status::Finished);
}

#[test]
fn test_overdue_alert_comes_before_due_soon_alert() {
    let today = d("2024-03-15");
    let mut due_soon = task("tarea-1", "2024-03-01", "2024-03-20", vec![activity("a", 20)]);
    due_soon.total_progress = 20;
    let mut late = task("tarea-2", "2024-03-01", "2024-03-12", vec![activity("b", 60)]);
    late.total_progress = 60;

    let alerts = generate(&[due_soon, late], today);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].task_id, "tarea-2");
    assert_eq!(alerts[0].kind, NotificationKind::Overdue);
    assert_eq!(alerts[0].priority, Priority::High);
    assert_eq!(alerts[1].task_id, "tarea-1");
    assert_eq!(alerts[1].kind, NotificationKind::DueSoon);
    assert_eq!(alerts[1].priority, Priority::Medium);
}

#[test]
fn test_alerts_follow_mutations() {
    let mut s = store(
        "2024-03-15",
        vec![task("tarea-1", "2024-03-01", "2024-03-12", vec![activity("tarea-1-act-1", 0)])],
    );
    assert_eq!(s.unread_count(), 1);
    s.finalize_task("tarea-1").unwrap();
    assert!(s.notifications().is_empty());
}

#[test]
fn test_unknown_ids_are_reported_and_change_nothing() {
    let mut s = store(
        "2024-03-05",
        vec![task("tarea-1", "2024-03-01", "2024-03-10", vec![activity("tarea-1-act-1", 0)])],
    );
    let before = s.tasks().to_vec();

    assert!(matches!(s.finalize_task("tarea-9"), Err(StoreError::NotFound { .. })));
    assert!(matches!(
        s.set_activity_completed("tarea-1", "nope", true),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(s.mark_notification_read("nope"), Err(StoreError::NotFound { .. })));
    assert_eq!(s.tasks(), before.as_slice());
}

#[test]
fn test_builtin_seed_dashboard_is_consistent() {
    let today = d("2024-06-15");
    let s = TaskStore::new(builtin_seed(today), ViewerContext::Administrator, Box::new(FixedClock(today)));
    let k = kpis(s.tasks(), today);
    assert_eq!(k.by_status.total(), k.total);
    for status in Status::ALL {
        assert!(k.by_status.get(status) > 0, "{status:?} missing from demo seed");
    }

    let dash = dashboard(s.tasks(), today);
    assert_eq!(dash.by_month.len(), 12);
    assert!(dash.by_area.iter().all(|a| a.count > 0));
}

#[test]
fn test_seed_file_round_trips_through_store() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{
            "id": "tarea-7",
            "name": "Replace pump seals",
            "areas": ["mantenimiento"],
            "start_date": "2024-03-01",
            "end_date": "2024-03-11",
            "priority": "high",
            "activities": [
                {{"id": "tarea-7-act-1", "name": "Drain", "percentage": 100, "completed": true}},
                {{"id": "tarea-7-act-2", "name": "Swap", "percentage": 0}}
            ],
            "created_by": "Admin",
            "created_at": "2024-02-28"
        }}]"#
    )
    .unwrap();

    let tasks = load_seed(file.path()).unwrap();
    assert_eq!(tasks[0].execution_days, 10);

    let mut s = store("2024-03-05", tasks);
    let t = s.get("tarea-7").unwrap();
    assert_eq!(t.total_progress, 50);
    assert_eq!(t.status, Status::InProgress);

    s.set_activity_completed("tarea-7", "tarea-7-act-2", true).unwrap();
    assert_eq!(s.get("tarea-7").unwrap().status, Status::Finished);
}
