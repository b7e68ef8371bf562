//! Task data structures.
//!
//! A `Task` is the record the store owns. `NewTask` is what a caller hands the
//! store to create one, and `TaskUpdate` is a partial set of fields merged into
//! an existing task. `total_progress` and `status` are derived and are only
//! ever written by the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};
use crate::fields::*;

/// A unit of work owned by one or more areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub areas: Vec<Area>,
    #[serde(default)]
    pub requires_support: bool,
    #[serde(default)]
    pub support_areas: Vec<Area>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Captured at creation; not recomputed when the dates change.
    #[serde(default)]
    pub execution_days: u32,
    pub priority: Priority,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub total_progress: u8,
    #[serde(default = "default_status")]
    pub status: Status,
    pub created_by: String,
    pub created_at: NaiveDate,
}

fn default_status() -> Status {
    Status::Planned
}

/// One step of a task's work breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub percentage: u8,
    #[serde(default)]
    pub completed: bool,
}

/// A named reference attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub reference: String,
}

impl Task {
    pub fn is_owned_by(&self, area: Area) -> bool {
        self.areas.contains(&area)
    }

    pub fn is_supported_by(&self, area: Area) -> bool {
        self.support_areas.contains(&area)
    }

    /// Owned by, or supported by, the area.
    pub fn involves(&self, area: Area) -> bool {
        self.is_owned_by(area) || self.is_supported_by(area)
    }

    /// Shared between several owners, or pulling in supporting areas.
    pub fn is_collaborative(&self) -> bool {
        self.areas.len() > 1 || (self.requires_support && !self.support_areas.is_empty())
    }
}

/// Activity as supplied when creating a task; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewActivity {
    pub name: String,
    pub percentage: u8,
    pub completed: bool,
}

impl NewActivity {
    pub fn named(name: impl Into<String>) -> Self {
        NewActivity {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Everything needed to create a task except identity, creation metadata
/// and derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub areas: Vec<Area>,
    pub requires_support: bool,
    pub support_areas: Vec<Area>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub priority: Priority,
    pub activities: Vec<NewActivity>,
    pub documents: Vec<Document>,
}

impl NewTask {
    /// Check the create-time invariants, reporting every violation found.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = Vec::new();
        if self.name.trim().is_empty() {
            errs.push(ValidationError::BlankName);
        }
        if self.areas.is_empty() {
            errs.push(ValidationError::NoOwnerArea);
        }
        if self.end_date <= self.start_date {
            errs.push(ValidationError::EndNotAfterStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if !self.activities.iter().any(|a| !a.name.trim().is_empty()) {
            errs.push(ValidationError::NoNamedActivity);
        }
        for a in self.activities.iter().filter(|a| a.percentage > 100) {
            errs.push(ValidationError::PercentageOutOfRange {
                activity: a.name.trim().to_string(),
                percentage: a.percentage,
            });
        }
        if errs.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errs))
        }
    }
}

/// Partial update merged into an existing task. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub areas: Option<Vec<Area>>,
    pub requires_support: Option<bool>,
    pub support_areas: Option<Vec<Area>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub execution_days: Option<u32>,
    pub priority: Option<Priority>,
    pub activities: Option<Vec<Activity>>,
    pub documents: Option<Vec<Document>>,
}

impl TaskUpdate {
    /// Merge the set fields into `task`. Derived fields are left to the caller.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(v) = self.name {
            task.name = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.areas {
            task.areas = v;
        }
        if let Some(v) = self.requires_support {
            task.requires_support = v;
        }
        if let Some(v) = self.support_areas {
            task.support_areas = v;
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.end_date {
            task.end_date = v;
        }
        if let Some(v) = self.execution_days {
            task.execution_days = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.activities {
            task.activities = v;
        }
        if let Some(v) = self.documents {
            task.documents = v;
        }
    }
}
