//! Display formatting and input parsing helpers.
//!
//! Dates are shown day-first (`dd/mm/yyyy`) everywhere; labels for statuses,
//! priorities, areas and months are fixed.

use chrono::{Duration, NaiveDate};

use crate::fields::*;
use crate::kpi::ListStats;
use crate::query::{row_highlight, Highlight};
use crate::status::days_remaining;
use crate::task::Task;

pub const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Format a date as `dd/mm/yyyy`.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}

/// Format a status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Planned => "Planned",
        Status::InProgress => "In progress",
        Status::Finished => "Finished",
        Status::Overdue => "Overdue",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

/// Comma-separated area labels, or "-" when empty.
pub fn format_areas(areas: &[Area]) -> String {
    if areas.is_empty() {
        return "-".into();
    }
    areas.iter().map(|a| a.label()).collect::<Vec<_>>().join(", ")
}

/// Month name for a 0-based month index.
pub fn month_name(month0: u32) -> &'static str {
    MONTHS.get(month0 as usize).copied().unwrap_or("-")
}

/// Format an end date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(end: NaiveDate, today: NaiveDate) -> String {
    match days_remaining(end, today) {
        0 => "today".into(),
        1 => "tomorrow".into(),
        n if n > 1 => format!("in {n}d"),
        n => format!("{}d late", -n),
    }
}

/// Text progress bar, e.g. `[#####-----]`.
pub fn progress_bar(pct: u8, width: usize) -> String {
    let filled = (usize::from(pct.min(100)) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if width == 0 {
        String::new()
    } else if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Parse a date typed by a user.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" and "DD/MM/YYYY"
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&s, "%d/%m/%Y"))
        .ok()
}

fn highlight_marker(task: &Task, today: NaiveDate) -> &'static str {
    match row_highlight(task, today) {
        Some(Highlight::Critical) => "!!",
        Some(Highlight::Warning) => "! ",
        None => "  ",
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "   {:<12} {:<28} {:<12} {:<7} {:<14} {:<11} {:<10} {}",
        "ID", "Name", "Status", "Pri", "Progress", "End", "Due", "Areas"
    );
    for t in tasks {
        println!(
            "{} {:<12} {:<28} {:<12} {:<7} {:<14} {:<11} {:<10} {}",
            highlight_marker(t, today),
            truncate(&t.id, 12),
            truncate(&t.name, 28),
            format_status(crate::status::status_of(t, today)),
            format_priority(t.priority),
            format!("{} {:>3}%", progress_bar(t.total_progress, 8), t.total_progress),
            format_date(t.end_date),
            format_due_relative(t.end_date, today),
            format_areas(&t.areas),
        );
    }
}

/// Print the one-line summary shown above a list.
pub fn print_list_stats(stats: &ListStats) {
    println!(
        "Tasks: {}  Finished: {}  Overdue: {}  Avg progress: {}%",
        stats.total, stats.finished, stats.overdue, stats.avg_progress
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_format_date_is_day_first_two_digit() {
        assert_eq!(format_date(d("2024-03-05")), "05/03/2024");
    }

    #[test]
    fn test_format_due_relative() {
        let today = d("2024-03-10");
        assert_eq!(format_due_relative(d("2024-03-10"), today), "today");
        assert_eq!(format_due_relative(d("2024-03-11"), today), "tomorrow");
        assert_eq!(format_due_relative(d("2024-03-14"), today), "in 4d");
        assert_eq!(format_due_relative(d("2024-03-08"), today), "2d late");
    }

    #[test]
    fn test_parse_date_input() {
        let today = d("2024-03-10");
        assert_eq!(parse_date_input("today", today), Some(today));
        assert_eq!(parse_date_input("in 3d", today), Some(d("2024-03-13")));
        assert_eq!(parse_date_input("in 2w", today), Some(d("2024-03-24")));
        assert_eq!(parse_date_input("2024-04-01", today), Some(d("2024-04-01")));
        assert_eq!(parse_date_input("01/04/2024", today), Some(d("2024-04-01")));
        assert_eq!(parse_date_input("soon", today), None);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 4), "[----]");
        assert_eq!(progress_bar(50, 4), "[##--]");
        assert_eq!(progress_bar(100, 4), "[####]");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer name", 6), "a lon…");
        assert_eq!(truncate("a longer name", 1), "…");
        assert_eq!(truncate("abc", 0), "");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(0), "January");
        assert_eq!(month_name(11), "December");
        assert_eq!(month_name(12), "-");
    }
}
