//! In-memory task store.
//!
//! The `TaskStore` owns the task collection, the current notifications and
//! the viewer selection. It is constructed once by the caller and passed
//! around by reference; there is no global instance.
//!
//! Every write builds a new collection (clone, modify, replace), so a failed
//! lookup never leaves a half-applied change behind. After every write the
//! affected task's `total_progress` and `status` are recomputed and the full
//! notification list is rebuilt.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Entity, StoreError};
use crate::fields::{Status, ViewerContext};
use crate::notify::{self, Notification};
use crate::status::{execution_days, status_of, total_progress, Clock};
use crate::task::{Activity, NewTask, Task, TaskUpdate};

const TASK_ID_PREFIX: &str = "tarea-";

pub struct TaskStore {
    tasks: Vec<Task>,
    notifications: Vec<Notification>,
    /// Ids of notifications the user has read, carried across rebuilds.
    read_ids: HashSet<String>,
    viewer: ViewerContext,
    clock: Box<dyn Clock>,
}

impl TaskStore {
    /// Build a store from seed tasks. Derived fields of the seed are
    /// recomputed rather than trusted.
    pub fn new(seed: Vec<Task>, viewer: ViewerContext, clock: Box<dyn Clock>) -> Self {
        let today = clock.today();
        let tasks: Vec<Task> = seed
            .into_iter()
            .map(|mut t| {
                recompute(&mut t, today);
                t
            })
            .collect();
        info!(tasks = tasks.len(), %today, "task store initialised");

        let mut store = TaskStore {
            tasks,
            notifications: Vec::new(),
            read_ids: HashSet::new(),
            viewer,
            clock,
        };
        store.rebuild_notifications();
        store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn viewer(&self) -> ViewerContext {
        self.viewer
    }

    pub fn set_viewer(&mut self, viewer: ViewerContext) {
        debug!(?viewer, "viewer changed");
        self.viewer = viewer;
    }

    /// Validate and add a new task, returning its id.
    ///
    /// Blank-named activities are dropped, support areas are cleared unless
    /// support is required, and the schedule length is captured once here.
    pub fn add_task(&mut self, new: NewTask) -> Result<String, StoreError> {
        new.validate()?;

        let today = self.today();
        let id = self.next_task_id();
        let activities: Vec<Activity> = new
            .activities
            .into_iter()
            .filter(|a| !a.name.trim().is_empty())
            .enumerate()
            .map(|(i, a)| Activity {
                id: format!("{}-act-{}", id, i + 1),
                name: a.name.trim().to_string(),
                percentage: a.percentage,
                completed: a.completed,
            })
            .collect();

        let mut task = Task {
            id: id.clone(),
            name: new.name.trim().to_string(),
            description: new.description,
            areas: new.areas,
            requires_support: new.requires_support,
            support_areas: if new.requires_support { new.support_areas } else { Vec::new() },
            start_date: new.start_date,
            end_date: new.end_date,
            execution_days: execution_days(new.start_date, new.end_date),
            priority: new.priority,
            activities,
            documents: new.documents,
            total_progress: 0,
            status: Status::Planned,
            created_by: self.viewer.creator_label(),
            created_at: today,
        };
        recompute(&mut task, today);
        debug!(task_id = %id, status = ?task.status, progress = task.total_progress, "task added");

        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next);
        Ok(id)
    }

    /// Merge `update` into a task and recompute its derived fields.
    /// Create-time invariants are not re-checked.
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<(), StoreError> {
        let today = self.today();
        self.modify(id, |task| {
            update.apply_to(task);
            recompute(task, today);
        })
    }

    /// Mark one activity done (100%) or not done (0%), overwriting any
    /// partial percentage.
    pub fn set_activity_completed(
        &mut self,
        task_id: &str,
        activity_id: &str,
        completed: bool,
    ) -> Result<(), StoreError> {
        let Some(task) = self.get(task_id) else {
            warn!(task_id, "toggle on unknown task");
            return Err(StoreError::not_found(Entity::Task, task_id));
        };
        if !task.activities.iter().any(|a| a.id == activity_id) {
            warn!(task_id, activity_id, "toggle on unknown activity");
            return Err(StoreError::not_found(Entity::Activity, activity_id));
        }

        let today = self.today();
        self.modify(task_id, |task| {
            for a in task.activities.iter_mut().filter(|a| a.id == activity_id) {
                a.completed = completed;
                a.percentage = if completed { 100 } else { 0 };
            }
            recompute(task, today);
        })
    }

    /// Force a task to complete: every activity done, progress 100 and
    /// status Finished regardless of dates.
    pub fn finalize_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.modify(id, |task| {
            for a in task.activities.iter_mut() {
                a.completed = true;
                a.percentage = 100;
            }
            task.total_progress = 100;
            task.status = Status::Finished;
        })
    }

    /// Flag a notification as read. The flag survives later rebuilds.
    pub fn mark_notification_read(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) else {
            warn!(notification_id = id, "mark-read on unknown notification");
            return Err(StoreError::not_found(Entity::Notification, id));
        };
        n.read = true;
        self.read_ids.insert(id.to_string());
        Ok(())
    }

    fn modify<F>(&mut self, id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            warn!(task_id = id, "update on unknown task");
            return Err(StoreError::not_found(Entity::Task, id));
        };
        let mut next = self.tasks.clone();
        f(&mut next[idx]);
        debug!(
            task_id = id,
            status = ?next[idx].status,
            progress = next[idx].total_progress,
            "task updated"
        );
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = next;
        self.rebuild_notifications();
    }

    fn rebuild_notifications(&mut self) {
        let mut fresh = notify::generate(&self.tasks, self.today());
        self.read_ids.retain(|id| fresh.iter().any(|n| &n.id == id));
        for n in fresh.iter_mut() {
            n.read = self.read_ids.contains(&n.id);
        }
        self.notifications = fresh;
    }

    fn next_task_id(&self) -> String {
        let next = self
            .tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix(TASK_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        format!("{TASK_ID_PREFIX}{next}")
    }
}

/// Recompute the derived fields of a task.
fn recompute(task: &mut Task, today: NaiveDate) {
    task.total_progress = total_progress(&task.activities);
    task.status = status_of(task, today);
}
