//! Status and progress derivation.
//!
//! Everything here is a pure function of its arguments. "Today" is always
//! passed in; the only place that reads the wall clock is `SystemClock`.

use chrono::{Local, NaiveDate};

use crate::fields::Status;
use crate::task::{Activity, Task};

/// Source of the current date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Derive the lifecycle status of a task on `today`.
///
/// Rules short-circuit in order: complete progress wins over any date,
/// then not-yet-started, then past the end date.
pub fn status_of(task: &Task, today: NaiveDate) -> Status {
    derive_status(task.start_date, task.end_date, task.total_progress, today)
}

/// `status_of` over the raw inputs.
pub fn derive_status(start: NaiveDate, end: NaiveDate, total_progress: u8, today: NaiveDate) -> Status {
    if total_progress == 100 {
        Status::Finished
    } else if today < start {
        Status::Planned
    } else if today > end {
        Status::Overdue
    } else {
        Status::InProgress
    }
}

/// Mean completion of the activities, rounded half-up; 0 when there are none.
///
/// Percentages are taken as given.
pub fn total_progress(activities: &[Activity]) -> u8 {
    let sum: u64 = activities.iter().map(|a| u64::from(a.percentage)).sum();
    rounded_mean(sum, activities.len()) as u8
}

/// Whole days from `today` until `end`; negative once `end` has passed.
pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

/// Length of the schedule in days, never negative.
pub fn execution_days(start: NaiveDate, end: NaiveDate) -> u32 {
    (end - start).num_days().max(0) as u32
}

/// `round(sum / count)` with halves rounded up, 0 for an empty set.
pub(crate) fn rounded_mean(sum: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    (sum * 2 + count) / (count * 2)
}
