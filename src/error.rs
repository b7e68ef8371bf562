//! Error types for the task store and seed loading.

use std::fmt;
use std::path::PathBuf;

/// A create-time invariant that a new task breaks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required")]
    BlankName,

    #[error("select at least one owning area")]
    NoOwnerArea,

    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("add at least one named activity")]
    NoNamedActivity,

    #[error("activity '{activity}' is at {percentage}%, above 100%")]
    PercentageOutOfRange { activity: String, percentage: u8 },
}

/// Every violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn contains(&self, err: &ValidationError) -> bool {
        self.0.contains(err)
    }
}

fn join_messages(errs: &[ValidationError]) -> String {
    errs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

/// What an unknown id referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Task,
    Activity,
    Notification,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Entity::Task => "task",
            Entity::Activity => "activity",
            Entity::Notification => "notification",
        };
        f.write_str(s)
    }
}

/// Failure of a store operation. The collection is unchanged when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid task: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: Entity, id: String },
}

impl StoreError {
    pub fn not_found(kind: Entity, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Failure while loading seed data.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    BadDate(String),

    #[error("seed file {path}: activity {activity_id} of task {task_id} is at {percentage}%, above 100%")]
    PercentageOutOfRange {
        path: PathBuf,
        task_id: String,
        activity_id: String,
        percentage: u8,
    },
}
