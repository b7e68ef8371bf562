//! Filtering, sorting and paging of task lists, plus the per-viewer and
//! collaborative views.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::fields::*;
use crate::kpi::average_progress;
use crate::status::{days_remaining, status_of};
use crate::task::Task;

/// Rows per page of the task list.
pub const PAGE_SIZE: usize = 10;

/// Criteria for narrowing a task list. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    /// Month of the start date, 0 = January.
    pub month: Option<u32>,
    /// Owning area.
    pub area: Option<Area>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        *self == TaskFilter::default()
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty()
                && !task.name.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(m) = self.month {
            if task.start_date.month0() != m {
                return false;
            }
        }
        if let Some(a) = self.area {
            if !task.is_owned_by(a) {
                return false;
            }
        }
        if let Some(s) = self.status {
            if status_of(task, today) != s {
                return false;
            }
        }
        if let Some(p) = self.priority {
            if task.priority != p {
                return false;
            }
        }
        true
    }

    /// Matching tasks in collection order.
    pub fn apply<'a>(&self, tasks: &'a [Task], today: NaiveDate) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t, today)).collect()
    }
}

/// Stable in-place sort of a task list.
pub fn sort_tasks(tasks: &mut [&Task], field: SortField, direction: SortDirection, today: NaiveDate) {
    tasks.sort_by(|a, b| {
        let ord = compare(a, b, field, today);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &Task, b: &Task, field: SortField, today: NaiveDate) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Status => status_of(a, today).sort_rank().cmp(&status_of(b, today).sort_rank()),
        SortField::Progress => a.total_progress.cmp(&b.total_progress),
        SortField::EndDate => a.end_date.cmp(&b.end_date),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
    }
}

/// Number of pages needed for `len` rows.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Rows of the 1-based `page`; empty past the end.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// One entry of a page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Page numbers to show around `current`: every page up to five, otherwise
/// first, neighbours of `current` and last, with gaps collapsed.
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    if total <= 5 {
        return (1..=total).map(PageLink::Page).collect();
    }
    let mut out = vec![PageLink::Page(1)];
    if current > 3 {
        out.push(PageLink::Ellipsis);
    }
    let lo = current.saturating_sub(1).max(2);
    let hi = (current + 1).min(total - 1);
    for p in lo..=hi {
        out.push(PageLink::Page(p));
    }
    if current + 2 < total {
        out.push(PageLink::Ellipsis);
    }
    out.push(PageLink::Page(total));
    out
}

/// Tasks the viewer is primarily responsible for: everything for the
/// administrator, owned tasks for an area user. Soonest deadline first.
pub fn my_primary_tasks<'a>(tasks: &'a [Task], viewer: ViewerContext, today: NaiveDate) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = match viewer {
        ViewerContext::Administrator => tasks.iter().collect(),
        ViewerContext::AreaUser(area) => tasks.iter().filter(|t| t.is_owned_by(area)).collect(),
    };
    out.sort_by_key(|t| days_remaining(t.end_date, today));
    out
}

/// Tasks another area owns that the viewer's area supports. Always empty for
/// the administrator.
pub fn shared_with_me<'a>(tasks: &'a [Task], viewer: ViewerContext, today: NaiveDate) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = match viewer {
        ViewerContext::Administrator => Vec::new(),
        ViewerContext::AreaUser(area) => tasks
            .iter()
            .filter(|t| !t.is_owned_by(area) && t.is_supported_by(area))
            .collect(),
    };
    out.sort_by_key(|t| days_remaining(t.end_date, today));
    out
}

/// Counters on the "my tasks" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MyStats {
    pub in_progress: usize,
    pub due_soon: usize,
    pub overdue: usize,
}

pub fn my_stats(tasks: &[&Task], today: NaiveDate) -> MyStats {
    let mut stats = MyStats { in_progress: 0, due_soon: 0, overdue: 0 };
    for t in tasks {
        let status = status_of(t, today);
        let days = days_remaining(t.end_date, today);
        match status {
            Status::InProgress => stats.in_progress += 1,
            Status::Overdue => stats.overdue += 1,
            _ => {}
        }
        if days > 0 && days <= 7 && status != Status::Finished {
            stats.due_soon += 1;
        }
    }
    stats
}

pub fn collaborative_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_collaborative()).collect()
}

/// Narrow collaborative tasks by an involved area (owner or supporter) and
/// status.
pub fn filter_collaborative<'a>(
    tasks: &[&'a Task],
    area: Option<Area>,
    status: Option<Status>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .copied()
        .filter(|t| area.map_or(true, |a| t.involves(a)))
        .filter(|t| status.map_or(true, |s| status_of(t, today) == s))
        .collect()
}

/// Counters on the collaborative view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollabStats {
    pub total: usize,
    pub in_progress: usize,
    pub finished: usize,
    pub overdue: usize,
    pub avg_progress: u8,
}

pub fn collab_stats(tasks: &[&Task], today: NaiveDate) -> CollabStats {
    let count = |s: Status| tasks.iter().filter(|t| status_of(t, today) == s).count();
    CollabStats {
        total: tasks.len(),
        in_progress: count(Status::InProgress),
        finished: count(Status::Finished),
        overdue: count(Status::Overdue),
        avg_progress: average_progress(tasks.iter().copied()),
    }
}

/// Attention marker for a row in a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Critical,
    Warning,
}

/// Overdue rows are critical; open rows ending within five days are a warning.
pub fn row_highlight(task: &Task, today: NaiveDate) -> Option<Highlight> {
    let status = status_of(task, today);
    let days = days_remaining(task.end_date, today);
    if status == Status::Overdue {
        Some(Highlight::Critical)
    } else if days > 0 && days <= 5 && status != Status::Finished {
        Some(Highlight::Warning)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: &str, name: &str, areas: &[Area], start: &str, end: &str, progress: u8, pri: Priority) -> Task {
        Task {
            id: id.into(),
            name: name.into(),
            description: format!("about {name}"),
            areas: areas.to_vec(),
            requires_support: false,
            support_areas: vec![],
            start_date: d(start),
            end_date: d(end),
            execution_days: 0,
            priority: pri,
            activities: vec![],
            documents: vec![],
            total_progress: progress,
            status: Status::Planned,
            created_by: "Admin".into(),
            created_at: d(start),
        }
    }

    fn fixture() -> Vec<Task> {
        let mut shared = task("4", "Fence repair", &[Area::Mantenimiento], "2024-03-10", "2024-03-18", 20, Priority::Low);
        shared.requires_support = true;
        shared.support_areas = vec![Area::Seguridad];
        vec![
            task("1", "Water audit", &[Area::MedioAmbiente], "2024-03-01", "2024-03-30", 50, Priority::Medium),
            task("2", "Badge renewal", &[Area::Seguridad], "2024-02-01", "2024-03-01", 10, Priority::High),
            task("3", "Contract review", &[Area::Legal, Area::Compras], "2024-04-01", "2024-04-20", 0, Priority::Medium),
            shared,
            task("5", "Safety drill", &[Area::Seguridad], "2024-01-10", "2024-01-12", 100, Priority::High),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_filter_by_each_criterion() {
        let today = d("2024-03-15");
        let tasks = fixture();

        let f = TaskFilter { search: Some("AUDIT".into()), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["1"]);

        let f = TaskFilter { search: Some("about fence".into()), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["4"]);

        let f = TaskFilter { month: Some(2), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["1", "4"]);

        let f = TaskFilter { area: Some(Area::Seguridad), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["2", "5"], "supporters are not owners");

        let f = TaskFilter { status: Some(Status::Overdue), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["2"]);

        let f = TaskFilter { priority: Some(Priority::Medium), month: Some(3), ..Default::default() };
        assert_eq!(ids(&f.apply(&tasks, today)), vec!["3"]);

        assert!(TaskFilter::default().is_empty());
        assert_eq!(TaskFilter::default().apply(&tasks, today).len(), tasks.len());
    }

    #[test]
    fn test_sort_fields_and_direction() {
        let today = d("2024-03-15");
        let tasks = fixture();
        let mut list: Vec<&Task> = tasks.iter().collect();

        sort_tasks(&mut list, SortField::Name, SortDirection::Asc, today);
        assert_eq!(ids(&list), vec!["2", "3", "4", "5", "1"]);

        sort_tasks(&mut list, SortField::EndDate, SortDirection::Desc, today);
        assert_eq!(ids(&list), vec!["3", "1", "4", "2", "5"]);

        sort_tasks(&mut list, SortField::Progress, SortDirection::Asc, today);
        assert_eq!(ids(&list), vec!["3", "2", "4", "1", "5"]);

        let mut list: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut list, SortField::Priority, SortDirection::Asc, today);
        assert_eq!(ids(&list), vec!["2", "5", "1", "3", "4"], "ties keep collection order");
    }

    #[test]
    fn test_status_sort_puts_overdue_first() {
        let today = d("2024-03-15");
        let tasks = fixture();

        let mut list: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut list, SortField::Status, SortDirection::Asc, today);
        assert_eq!(ids(&list), vec!["2", "1", "4", "5", "3"]);

        let mut list: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut list, SortField::Status, SortDirection::Desc, today);
        assert_eq!(ids(&list), vec!["3", "5", "1", "4", "2"]);
    }

    #[test]
    fn test_paginate() {
        let rows: Vec<usize> = (0..23).collect();
        assert_eq!(page_count(rows.len()), 3);
        assert_eq!(page_count(0), 0);
        assert_eq!(paginate(&rows, 1), &rows[0..10]);
        assert_eq!(paginate(&rows, 3), &rows[20..23]);
        assert!(paginate(&rows, 4).is_empty());
        assert_eq!(paginate(&rows, 0), &rows[0..10]);
    }

    #[test]
    fn test_page_links() {
        use PageLink::*;
        assert_eq!(page_links(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_links(1, 10), vec![Page(1), Page(2), Ellipsis, Page(10)]);
        assert_eq!(page_links(5, 10), vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]);
        assert_eq!(page_links(10, 10), vec![Page(1), Ellipsis, Page(9), Page(10)]);
    }

    #[test]
    fn test_viewer_views() {
        let today = d("2024-03-15");
        let tasks = fixture();

        let admin = my_primary_tasks(&tasks, ViewerContext::Administrator, today);
        assert_eq!(ids(&admin), vec!["5", "2", "4", "1", "3"]);
        assert!(shared_with_me(&tasks, ViewerContext::Administrator, today).is_empty());

        let seg = ViewerContext::AreaUser(Area::Seguridad);
        assert_eq!(ids(&my_primary_tasks(&tasks, seg, today)), vec!["5", "2"]);
        assert_eq!(ids(&shared_with_me(&tasks, seg, today)), vec!["4"]);
    }

    #[test]
    fn test_my_stats() {
        let today = d("2024-03-15");
        let tasks = fixture();
        let all: Vec<&Task> = tasks.iter().collect();
        assert_eq!(my_stats(&all, today), MyStats { in_progress: 2, due_soon: 1, overdue: 1 });
    }

    #[test]
    fn test_collaborative_views() {
        let today = d("2024-03-15");
        let tasks = fixture();
        let collab = collaborative_tasks(&tasks);
        assert_eq!(ids(&collab), vec!["3", "4"]);

        assert_eq!(ids(&filter_collaborative(&collab, Some(Area::Seguridad), None, today)), vec!["4"]);
        assert_eq!(ids(&filter_collaborative(&collab, None, Some(Status::Planned), today)), vec!["3"]);

        assert_eq!(
            collab_stats(&collab, today),
            CollabStats { total: 2, in_progress: 1, finished: 0, overdue: 0, avg_progress: 10 }
        );
    }

    #[test]
    fn test_row_highlight() {
        let today = d("2024-03-15");
        let tasks = fixture();
        assert_eq!(row_highlight(&tasks[1], today), Some(Highlight::Critical));
        assert_eq!(row_highlight(&tasks[0], today), None);
        let mut near = tasks[0].clone();
        near.end_date = d("2024-03-20");
        assert_eq!(row_highlight(&near, today), Some(Highlight::Warning));
        near.total_progress = 100;
        assert_eq!(row_highlight(&near, today), None);
    }
}
