//! Seed data for the task store.
//!
//! A seed is a JSON array of tasks. When no file is given the builtin demo
//! seed is used; its dates are laid out around "today" so that every status,
//! the due-soon window and collaborative work all show up.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::error::SeedError;
use crate::fields::{Area, Priority, Status};
use crate::status::execution_days;
use crate::task::{Activity, Document, Task};

/// Load tasks from a JSON seed file.
pub fn load_seed(path: &Path) -> Result<Vec<Task>, SeedError> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tasks: Vec<Task> = serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for t in &tasks {
        if let Some(a) = t.activities.iter().find(|a| a.percentage > 100) {
            return Err(SeedError::PercentageOutOfRange {
                path: path.to_path_buf(),
                task_id: t.id.clone(),
                activity_id: a.id.clone(),
                percentage: a.percentage,
            });
        }
    }
    for t in tasks.iter_mut().filter(|t| t.execution_days == 0) {
        t.execution_days = execution_days(t.start_date, t.end_date);
    }
    info!(path = %path.display(), tasks = tasks.len(), "seed loaded");
    Ok(tasks)
}

/// Parse a `YYYY-MM-DD` date given on the command line.
pub fn parse_today(s: &str) -> Result<NaiveDate, SeedError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| SeedError::BadDate(s.to_string()))
}

struct Demo {
    name: &'static str,
    description: &'static str,
    areas: &'static [Area],
    support: &'static [Area],
    /// Start, relative to today.
    start: i64,
    /// End, relative to today.
    end: i64,
    priority: Priority,
    activities: &'static [(&'static str, u8)],
    documents: &'static [(&'static str, &'static str)],
}

const DEMO: &[Demo] = &[
    Demo {
        name: "Quarterly fire drill",
        description: "Evacuation drill for the processing plant and offices",
        areas: &[Area::Seguridad],
        support: &[Area::Operaciones],
        start: -40,
        end: -10,
        priority: Priority::High,
        activities: &[("Plan routes", 100), ("Brief wardens", 100), ("Run drill", 100)],
        documents: &[("Drill report", "docs/drill-q1.pdf")],
    },
    Demo {
        name: "Renew land-use permits",
        description: "File renewals for the north access road permits",
        areas: &[Area::Legal],
        support: &[Area::Comunidades],
        start: -30,
        end: -3,
        priority: Priority::High,
        activities: &[("Collect titles", 100), ("Draft filing", 50), ("Submit", 0)],
        documents: &[],
    },
    Demo {
        name: "Conveyor belt overhaul",
        description: "Replace worn idlers and belt section on line 2",
        areas: &[Area::Mantenimiento, Area::Operaciones],
        support: &[],
        start: -14,
        end: 4,
        priority: Priority::Medium,
        activities: &[("Order parts", 100), ("Stop line", 0), ("Replace idlers", 0), ("Test run", 0)],
        documents: &[("Work order", "WO-2231")],
    },
    Demo {
        name: "Water quality sampling",
        description: "Monthly sampling at the three discharge points",
        areas: &[Area::MedioAmbiente],
        support: &[Area::Calidad],
        start: -5,
        end: 6,
        priority: Priority::Medium,
        activities: &[("Sample point A", 100), ("Sample point B", 100), ("Sample point C", 0)],
        documents: &[],
    },
    Demo {
        name: "Community town hall",
        description: "Present the expansion plan to neighbouring villages",
        areas: &[Area::Comunidades],
        support: &[Area::Legal, Area::MedioAmbiente],
        start: -7,
        end: 20,
        priority: Priority::High,
        activities: &[("Book venue", 100), ("Prepare slides", 40), ("Hold meeting", 0)],
        documents: &[("Agenda", "docs/town-hall-agenda.docx")],
    },
    Demo {
        name: "Supplier audit",
        description: "On-site audit of the reagent supplier",
        areas: &[Area::Compras, Area::Calidad],
        support: &[],
        start: -20,
        end: 10,
        priority: Priority::Low,
        activities: &[("Checklist", 100), ("Visit", 0)],
        documents: &[],
    },
    Demo {
        name: "Calibrate lab balances",
        description: "",
        areas: &[Area::Calidad],
        support: &[],
        start: -2,
        end: 1,
        priority: Priority::Low,
        activities: &[("Balance 1", 100), ("Balance 2", 0)],
        documents: &[],
    },
    Demo {
        name: "Tender for haul trucks",
        description: "Request quotes for two additional haul trucks",
        areas: &[Area::Compras],
        support: &[Area::Operaciones],
        start: 5,
        end: 45,
        priority: Priority::Medium,
        activities: &[("Specification", 0), ("Publish tender", 0), ("Evaluate bids", 0)],
        documents: &[],
    },
    Demo {
        name: "Tailings dam inspection",
        description: "Annual geotechnical inspection of the tailings dam",
        areas: &[Area::MedioAmbiente, Area::Seguridad],
        support: &[Area::Mantenimiento],
        start: 10,
        end: 25,
        priority: Priority::High,
        activities: &[("Hire inspector", 0), ("Inspection", 0)],
        documents: &[],
    },
    Demo {
        name: "Shift roster update",
        description: "Rework rosters for the new crusher shift",
        areas: &[Area::Operaciones],
        support: &[],
        start: -60,
        end: -15,
        priority: Priority::Low,
        activities: &[("Draft roster", 100), ("Union review", 100)],
        documents: &[],
    },
    Demo {
        name: "Pump station maintenance",
        description: "Preventive maintenance on the river pump station",
        areas: &[Area::Mantenimiento],
        support: &[],
        start: -25,
        end: -1,
        priority: Priority::Medium,
        activities: &[("Inspect seals", 100), ("Replace bearings", 0)],
        documents: &[],
    },
    Demo {
        name: "PPE stock review",
        description: "Reconcile personal protective equipment stock",
        areas: &[Area::Seguridad],
        support: &[],
        start: -3,
        end: 12,
        priority: Priority::Low,
        activities: &[("Count stock", 30)],
        documents: &[],
    },
];

/// Demo tasks dated relative to `today`. Derived fields are left for the
/// store to compute.
pub fn builtin_seed(today: NaiveDate) -> Vec<Task> {
    DEMO.iter()
        .enumerate()
        .map(|(i, demo)| {
            let id = format!("tarea-{}", i + 1);
            let start_date = today + Duration::days(demo.start);
            let end_date = today + Duration::days(demo.end);
            Task {
                name: demo.name.to_string(),
                description: demo.description.to_string(),
                areas: demo.areas.to_vec(),
                requires_support: !demo.support.is_empty(),
                support_areas: demo.support.to_vec(),
                start_date,
                end_date,
                execution_days: execution_days(start_date, end_date),
                priority: demo.priority,
                activities: demo
                    .activities
                    .iter()
                    .enumerate()
                    .map(|(j, &(name, percentage))| Activity {
                        id: format!("{}-act-{}", id, j + 1),
                        name: name.to_string(),
                        percentage,
                        completed: percentage == 100,
                    })
                    .collect(),
                documents: demo
                    .documents
                    .iter()
                    .map(|&(name, reference)| Document {
                        name: name.to_string(),
                        reference: reference.to_string(),
                    })
                    .collect(),
                total_progress: 0,
                status: Status::Planned,
                created_by: "Admin".to_string(),
                created_at: start_date - Duration::days(7),
                id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::StatusCounts;
    use crate::status::total_progress;
    use std::io::Write;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_builtin_seed_covers_every_status() {
        let today = d("2024-06-15");
        let mut tasks = builtin_seed(today);
        for t in tasks.iter_mut() {
            t.total_progress = total_progress(&t.activities);
        }
        let counts = StatusCounts::of(&tasks, today);
        for status in Status::ALL {
            assert!(counts.get(status) > 0, "no {status:?} task in demo seed");
        }
    }

    #[test]
    fn test_builtin_seed_ids_are_unique() {
        let tasks = builtin_seed(d("2024-06-15"));
        let mut ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), tasks.len());
    }

    #[test]
    fn test_load_seed_fills_missing_execution_days() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"t-1","name":"Audit","areas":["legal"],"start_date":"2024-01-02",
                "end_date":"2024-01-09","priority":"high","created_by":"Admin","created_at":"2024-01-01"}}]"#
        )
        .unwrap();
        let tasks = load_seed(file.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].execution_days, 7);
        assert_eq!(tasks[0].areas, vec![Area::Legal]);
    }

    #[test]
    fn test_load_seed_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load_seed(file.path()), Err(SeedError::Parse { .. })));
        assert!(matches!(
            load_seed(Path::new("/definitely/not/here.json")),
            Err(SeedError::Io { .. })
        ));
    }

    #[test]
    fn test_load_seed_rejects_percentage_above_hundred() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"t-1","name":"Audit","areas":["legal"],"start_date":"2024-01-02",
                "end_date":"2024-01-09","priority":"high","created_by":"Admin","created_at":"2024-01-01",
                "activities":[{{"id":"t-1-act-1","name":"Read","percentage":150}}]}}]"#
        )
        .unwrap();
        match load_seed(file.path()) {
            Err(SeedError::PercentageOutOfRange { task_id, activity_id, percentage, .. }) => {
                assert_eq!(task_id, "t-1");
                assert_eq!(activity_id, "t-1-act-1");
                assert_eq!(percentage, 150);
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_today() {
        assert_eq!(parse_today("2024-02-29").unwrap(), d("2024-02-29"));
        assert!(matches!(parse_today("29/02/2024"), Err(SeedError::BadDate(_))));
    }
}
