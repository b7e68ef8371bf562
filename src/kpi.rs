//! Dashboard roll-ups over a task collection.
//!
//! None of these cache anything: callers recompute from the current tasks on
//! every read. All of them are total and return zeroed results for an empty
//! collection. Status is always derived with `status_of`, never read from the
//! stored field.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::fields::{Area, Status};
use crate::status::{rounded_mean, status_of};
use crate::task::Task;

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub planned: usize,
    pub in_progress: usize,
    pub finished: usize,
    pub overdue: usize,
}

impl StatusCounts {
    pub fn of(tasks: &[Task], today: NaiveDate) -> Self {
        let mut counts = StatusCounts::default();
        for t in tasks {
            counts.bump(status_of(t, today));
        }
        counts
    }

    pub fn bump(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Planned => self.planned,
            Status::InProgress => self.in_progress,
            Status::Finished => self.finished,
            Status::Overdue => self.overdue,
        }
    }

    pub fn total(&self) -> usize {
        self.planned + self.in_progress + self.finished + self.overdue
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Planned => &mut self.planned,
            Status::InProgress => &mut self.in_progress,
            Status::Finished => &mut self.finished,
            Status::Overdue => &mut self.overdue,
        }
    }
}

/// Headline figures of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub pending: usize,
    pub overall_progress: u8,
    pub avg_execution_days: u32,
    pub by_status: StatusCounts,
}

pub fn kpis(tasks: &[Task], today: NaiveDate) -> Kpis {
    let by_status = StatusCounts::of(tasks, today);
    Kpis {
        total: tasks.len(),
        pending: tasks.len() - by_status.finished,
        overall_progress: average_progress(tasks),
        avg_execution_days: rounded_mean(
            tasks.iter().map(|t| u64::from(t.execution_days)).sum(),
            tasks.len(),
        ) as u32,
        by_status,
    }
}

/// Rounded mean of `total_progress`, 0 for no tasks.
pub fn average_progress<'a, I>(tasks: I) -> u8
where
    I: IntoIterator<Item = &'a Task>,
{
    let (sum, n) = tasks
        .into_iter()
        .fold((0u64, 0usize), |(s, n), t| (s + u64::from(t.total_progress), n + 1));
    rounded_mean(sum, n) as u8
}

/// Completion figures for one owning area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCompletion {
    pub area: Area,
    pub avg_progress: u8,
    pub count: usize,
    pub finished_count: usize,
}

/// Completion per owning area, in the order of `areas`. Areas that own no
/// task are left out.
pub fn completion_by_area(tasks: &[Task], areas: &[Area], today: NaiveDate) -> Vec<AreaCompletion> {
    areas
        .iter()
        .filter_map(|&area| {
            let owned: Vec<&Task> = tasks.iter().filter(|t| t.is_owned_by(area)).collect();
            if owned.is_empty() {
                return None;
            }
            Some(AreaCompletion {
                area,
                avg_progress: average_progress(owned.iter().copied()),
                count: owned.len(),
                finished_count: owned
                    .iter()
                    .filter(|t| status_of(t, today) == Status::Finished)
                    .count(),
            })
        })
        .collect()
}

/// Tasks starting in one calendar month, split by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// 0 = January.
    pub month: u32,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

impl MonthBucket {
    pub fn total(&self) -> usize {
        self.counts.total()
    }
}

/// Twelve buckets, January first, keyed by the month of the start date.
/// Empty months are kept.
pub fn tasks_by_month(tasks: &[Task], today: NaiveDate) -> [MonthBucket; 12] {
    let mut buckets = [MonthBucket::default(); 12];
    for (i, b) in buckets.iter_mut().enumerate() {
        b.month = i as u32;
    }
    for t in tasks {
        buckets[t.start_date.month0() as usize].counts.bump(status_of(t, today));
    }
    buckets
}

/// Open work per owning area that has not yet passed its end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueByArea {
    pub by_area: Vec<(Area, usize)>,
    /// Open tasks ending within the next week, today included.
    pub urgent: usize,
}

impl DueByArea {
    pub fn total(&self) -> usize {
        self.by_area.iter().map(|(_, n)| n).sum()
    }
}

pub fn due_by_area(tasks: &[Task], today: NaiveDate) -> DueByArea {
    let week_end = today + Duration::days(7);
    let mut counts: BTreeMap<Area, usize> = BTreeMap::new();
    let mut urgent = 0;

    for t in tasks {
        if status_of(t, today) == Status::Finished || t.end_date < today {
            continue;
        }
        for &area in &t.areas {
            *counts.entry(area).or_default() += 1;
        }
        if t.end_date <= week_end {
            urgent += 1;
        }
    }

    DueByArea {
        by_area: Area::ALL
            .iter()
            .filter_map(|a| counts.get(a).map(|&n| (*a, n)))
            .collect(),
        urgent,
    }
}

/// Average scheduled length of the tasks an area owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaDuration {
    pub area: Area,
    pub avg_days: u32,
    pub count: usize,
}

/// Per-area average execution days, longest first, and the mean of those
/// averages.
pub fn execution_days_by_area(tasks: &[Task]) -> (Vec<AreaDuration>, u32) {
    let mut rows: Vec<AreaDuration> = Area::ALL
        .iter()
        .filter_map(|&area| {
            let (sum, n) = tasks
                .iter()
                .filter(|t| t.is_owned_by(area))
                .fold((0u64, 0usize), |(s, n), t| (s + u64::from(t.execution_days), n + 1));
            (n > 0).then(|| AreaDuration {
                area,
                avg_days: rounded_mean(sum, n) as u32,
                count: n,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.avg_days.cmp(&a.avg_days));

    let overall = rounded_mean(rows.iter().map(|r| u64::from(r.avg_days)).sum(), rows.len()) as u32;
    (rows, overall)
}

/// Summary line shown above a filtered task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListStats {
    pub total: usize,
    pub finished: usize,
    pub overdue: usize,
    pub avg_progress: u8,
}

pub fn list_stats(tasks: &[&Task], today: NaiveDate) -> ListStats {
    ListStats {
        total: tasks.len(),
        finished: tasks.iter().filter(|t| status_of(t, today) == Status::Finished).count(),
        overdue: tasks.iter().filter(|t| status_of(t, today) == Status::Overdue).count(),
        avg_progress: average_progress(tasks.iter().copied()),
    }
}

/// Everything the dashboard shows, computed in one pass over `tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub by_area: Vec<AreaCompletion>,
    pub by_month: Vec<MonthBucket>,
    pub due: DueByArea,
    pub durations: Vec<AreaDuration>,
    /// Mean of the per-area average execution days.
    pub avg_area_days: u32,
}

pub fn dashboard(tasks: &[Task], today: NaiveDate) -> Dashboard {
    let (durations, avg_area_days) = execution_days_by_area(tasks);
    Dashboard {
        kpis: kpis(tasks, today),
        by_area: completion_by_area(tasks, &Area::ALL, today),
        by_month: tasks_by_month(tasks, today).to_vec(),
        due: due_by_area(tasks, today),
        durations,
        avg_area_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: &str, areas: &[Area], start: &str, end: &str, progress: u8, days: u32) -> Task {
        Task {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            areas: areas.to_vec(),
            requires_support: false,
            support_areas: vec![],
            start_date: d(start),
            end_date: d(end),
            execution_days: days,
            priority: Priority::Medium,
            activities: vec![],
            documents: vec![],
            total_progress: progress,
            status: Status::Planned,
            created_by: "Admin".into(),
            created_at: d(start),
        }
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("done", &[Area::Seguridad], "2024-01-05", "2024-01-20", 100, 15),
            task("late", &[Area::Seguridad, Area::Legal], "2024-02-01", "2024-03-01", 40, 29),
            task("running", &[Area::Legal], "2024-03-01", "2024-03-30", 50, 29),
            task("future", &[Area::Compras], "2024-04-01", "2024-04-10", 0, 9),
        ]
    }

    #[test]
    fn test_kpis_over_fixture() {
        let today = d("2024-03-15");
        let k = kpis(&fixture(), today);
        assert_eq!(k.total, 4);
        assert_eq!(k.pending, 3);
        // (100 + 40 + 50 + 0) / 4 = 47.5
        assert_eq!(k.overall_progress, 48);
        // (15 + 29 + 29 + 9) / 4 = 20.5
        assert_eq!(k.avg_execution_days, 21);
        assert_eq!(
            k.by_status,
            StatusCounts { planned: 1, in_progress: 1, finished: 1, overdue: 1 }
        );
    }

    #[test]
    fn test_kpis_empty() {
        let k = kpis(&[], d("2024-03-15"));
        assert_eq!(k.total, 0);
        assert_eq!(k.pending, 0);
        assert_eq!(k.overall_progress, 0);
        assert_eq!(k.avg_execution_days, 0);
        assert_eq!(k.by_status.total(), 0);
    }

    #[test]
    fn test_completion_by_area_skips_empty_areas() {
        let today = d("2024-03-15");
        let got = completion_by_area(&fixture(), &Area::ALL, today);
        assert_eq!(
            got,
            vec![
                AreaCompletion { area: Area::Seguridad, avg_progress: 70, count: 2, finished_count: 1 },
                AreaCompletion { area: Area::Legal, avg_progress: 45, count: 2, finished_count: 0 },
                AreaCompletion { area: Area::Compras, avg_progress: 0, count: 1, finished_count: 0 },
            ]
        );
    }

    #[test]
    fn test_tasks_by_month_keeps_all_buckets() {
        let today = d("2024-03-15");
        let months = tasks_by_month(&fixture(), today);
        assert_eq!(months.len(), 12);
        for (i, b) in months.iter().enumerate() {
            assert_eq!(b.month, i as u32);
        }
        assert_eq!(months[0].counts.finished, 1);
        assert_eq!(months[1].counts.overdue, 1);
        assert_eq!(months[2].counts.in_progress, 1);
        assert_eq!(months[3].counts.planned, 1);
        assert!(months[4..].iter().all(|b| b.total() == 0));

        let empty = tasks_by_month(&[], today);
        assert!(empty.iter().all(|b| b.total() == 0));
        assert_eq!(empty[11].month, 11);
    }

    #[test]
    fn test_due_by_area_counts_open_unexpired_work() {
        let today = d("2024-03-15");
        let mut tasks = fixture();
        tasks.push(task("soon", &[Area::Legal, Area::Calidad], "2024-03-01", "2024-03-22", 10, 21));
        let due = due_by_area(&tasks, today);
        // "running", "future" and "soon" are open and unexpired.
        assert_eq!(
            due.by_area,
            vec![(Area::Legal, 2), (Area::Calidad, 1), (Area::Compras, 1)]
        );
        assert_eq!(due.total(), 4);
        // Only "soon" ends within the week.
        assert_eq!(due.urgent, 1);
    }

    #[test]
    fn test_execution_days_by_area_sorted_longest_first() {
        let (rows, overall) = execution_days_by_area(&fixture());
        let summary: Vec<(Area, u32)> = rows.iter().map(|r| (r.area, r.avg_days)).collect();
        assert_eq!(
            summary,
            vec![(Area::Legal, 29), (Area::Seguridad, 22), (Area::Compras, 9)]
        );
        // (29 + 22 + 9) / 3 = 20
        assert_eq!(overall, 20);
        assert_eq!(execution_days_by_area(&[]), (vec![], 0));
    }

    #[test]
    fn test_list_stats() {
        let today = d("2024-03-15");
        let tasks = fixture();
        let refs: Vec<&Task> = tasks.iter().collect();
        let s = list_stats(&refs, today);
        assert_eq!(s, ListStats { total: 4, finished: 1, overdue: 1, avg_progress: 48 });
    }

    #[test]
    fn test_dashboard_of_empty_collection_is_zeroed() {
        let dash = dashboard(&[], d("2024-03-15"));
        assert_eq!(dash.kpis.total, 0);
        assert!(dash.by_area.is_empty());
        assert_eq!(dash.by_month.len(), 12);
        assert_eq!(dash.due.total(), 0);
        assert_eq!(dash.avg_area_days, 0);
    }

    proptest! {
        #[test]
        fn prop_status_counts_sum_to_total(
            specs in proptest::collection::vec((0i64..365, 0i64..90, 0u8..=100), 0..30),
            today_off in 0i64..365,
        ) {
            let base = d("2024-01-01");
            let tasks: Vec<Task> = specs
                .iter()
                .enumerate()
                .map(|(i, &(s, len, p))| {
                    let mut t = task(&i.to_string(), &[Area::ALL[i % 8]], "2024-01-01", "2024-01-01", p, len as u32);
                    t.start_date = base + Duration::days(s);
                    t.end_date = t.start_date + Duration::days(len);
                    t
                })
                .collect();
            let today = base + Duration::days(today_off);
            let k = kpis(&tasks, today);
            prop_assert_eq!(k.by_status.total(), k.total);

            let areas = completion_by_area(&tasks, &Area::ALL, today);
            prop_assert!(areas.iter().all(|a| a.count > 0));

            let months = tasks_by_month(&tasks, today);
            prop_assert_eq!(months.iter().map(|b| b.total()).sum::<usize>(), tasks.len());
        }
    }
}
