//! Notification generation.
//!
//! Notifications are never stored with the tasks. They are rebuilt from the
//! whole collection on every change, and their ids are a function of the task
//! id and the notification kind so that a rebuild yields the same ids.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{NotificationKind, Priority, Status};
use crate::status::{days_remaining, status_of};
use crate::task::Task;

/// Window, in days, in which an in-progress task counts as due soon.
pub const DUE_SOON_DAYS: i64 = 7;

/// An alert about one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub task_id: String,
    pub priority: Priority,
    pub read: bool,
}

/// Deterministic notification id for a task and kind.
pub fn notification_id(task_id: &str, kind: NotificationKind) -> String {
    format!("notif-{}-{}", task_id, kind.id_suffix())
}

/// Alert for a single task on `today`, if any. At most one per task.
pub fn notification_for(task: &Task, today: NaiveDate) -> Option<Notification> {
    let days = days_remaining(task.end_date, today);
    let status = status_of(task, today);

    let (kind, message, priority) = if status == Status::Overdue {
        (
            NotificationKind::Overdue,
            format!("\"{}\" is overdue by {} days", task.name, days.abs()),
            Priority::High,
        )
    } else if days > 0 && days <= DUE_SOON_DAYS && status == Status::InProgress {
        (
            NotificationKind::DueSoon,
            format!("\"{}\" is due in {} days", task.name, days),
            Priority::Medium,
        )
    } else {
        return None;
    };

    Some(Notification {
        id: notification_id(&task.id, kind),
        kind,
        message,
        task_id: task.id.clone(),
        priority,
        read: false,
    })
}

/// All alerts for `tasks` on `today`, High priority first.
///
/// The sort is stable, so tasks keep their collection order within a
/// priority. Every notification comes back unread.
pub fn generate(tasks: &[Task], today: NaiveDate) -> Vec<Notification> {
    let mut out: Vec<Notification> = tasks
        .iter()
        .filter_map(|t| notification_for(t, today))
        .collect();
    out.sort_by_key(|n| n.priority.rank());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Area;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: &str, start: &str, end: &str, progress: u8) -> Task {
        Task {
            id: id.into(),
            name: format!("Task {id}"),
            description: String::new(),
            areas: vec![Area::Operaciones],
            requires_support: false,
            support_areas: vec![],
            start_date: d(start),
            end_date: d(end),
            execution_days: 0,
            priority: Priority::Low,
            activities: vec![],
            documents: vec![],
            total_progress: progress,
            status: Status::Planned,
            created_by: "Admin".into(),
            created_at: d(start),
        }
    }

    #[test]
    fn test_overdue_sorted_before_due_soon() {
        let today = d("2024-03-15");
        let tasks = vec![
            task("soon", "2024-03-01", "2024-03-20", 30),
            task("late", "2024-03-01", "2024-03-12", 30),
        ];
        let got = generate(&tasks, today);
        assert_eq!(got.len(), 2);

        assert_eq!(got[0].task_id, "late");
        assert_eq!(got[0].kind, NotificationKind::Overdue);
        assert_eq!(got[0].priority, Priority::High);
        assert_eq!(got[0].message, "\"Task late\" is overdue by 3 days");
        assert_eq!(got[0].id, "notif-late-overdue");

        assert_eq!(got[1].task_id, "soon");
        assert_eq!(got[1].kind, NotificationKind::DueSoon);
        assert_eq!(got[1].priority, Priority::Medium);
        assert_eq!(got[1].message, "\"Task soon\" is due in 5 days");
        assert!(!got[1].read);
    }

    #[test]
    fn test_due_soon_window_edges() {
        let today = d("2024-03-10");
        // Due today: neither overdue nor due-soon.
        assert_eq!(notification_for(&task("a", "2024-03-01", "2024-03-10", 0), today), None);
        // Exactly seven days out.
        let n = notification_for(&task("b", "2024-03-01", "2024-03-17", 0), today).unwrap();
        assert_eq!(n.kind, NotificationKind::DueSoon);
        // Eight days out.
        assert_eq!(notification_for(&task("c", "2024-03-01", "2024-03-18", 0), today), None);
    }

    #[test]
    fn test_planned_and_finished_tasks_are_silent() {
        let today = d("2024-03-10");
        // Planned, starts tomorrow, ends in three days.
        assert_eq!(notification_for(&task("p", "2024-03-11", "2024-03-13", 0), today), None);
        // Finished but long past its end date.
        assert_eq!(notification_for(&task("f", "2024-01-01", "2024-01-05", 100), today), None);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let today = d("2024-03-15");
        let tasks = vec![
            task("1", "2024-03-01", "2024-03-20", 30),
            task("2", "2024-02-01", "2024-03-01", 30),
            task("3", "2024-03-01", "2024-03-18", 0),
            task("4", "2024-01-01", "2024-02-01", 90),
        ];
        assert_eq!(generate(&tasks, today), generate(&tasks, today));
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let today = d("2024-03-15");
        let tasks = vec![
            task("x", "2024-03-01", "2024-03-16", 0),
            task("y", "2024-03-01", "2024-03-01", 0),
            task("z", "2024-03-01", "2024-03-17", 0),
            task("w", "2024-03-01", "2024-03-02", 0),
        ];
        let ids: Vec<String> = generate(&tasks, today).into_iter().map(|n| n.task_id).collect();
        assert_eq!(ids, vec!["y", "w", "x", "z"]);
    }
}
