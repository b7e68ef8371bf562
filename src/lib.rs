//! # tareas - operational task-tracking dashboard
//!
//! Tracks tasks owned by organisational areas, derives each task's status
//! from its dates and activity progress, and rolls the collection up into
//! KPIs, per-area and per-month charts and an alert list.
//!
//! ## Key Features
//!
//! - **Derived status**: Planned, In progress, Finished or Overdue, always
//!   recomputed from dates and progress rather than edited by hand
//! - **Activity-driven progress**: a task's progress is the rounded mean of its
//!   activities' percentages
//! - **Alerts**: overdue and due-within-a-week notifications, rebuilt after
//!   every change, with read flags carried across rebuilds
//! - **Roll-ups**: KPIs, completion by area, tasks per start month, open work
//!   by area and average duration by area
//! - **Views**: filterable/sortable/paginated list, "my tasks" per viewer and
//!   collaborative tasks across areas
//! - **Two interfaces**: read-only CLI reports and an interactive TUI where
//!   tasks can be created, activities ticked off and tasks finalized
//!
//! Nothing is persisted. Every run starts from a JSON seed file or the
//! builtin demo seed.

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod format;
pub mod kpi;
pub mod notify;
pub mod query;
pub mod seed;
pub mod status;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}
