//! Command implementations for the CLI interface.
//!
//! Every command except `ui` is a read-only report over the seeded store.
//! Reports print a plain table by default; `--json` dumps the same data with
//! serde_json for scripting.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;

use crate::fields::*;
use crate::format::*;
use crate::kpi::{dashboard, list_stats, ListStats};
use crate::query::*;
use crate::status::{days_remaining, status_of};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui,

    /// Show KPIs and roll-ups.
    Dashboard {
        /// Only tasks starting in this month (1-12).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Only tasks owned by this area.
        #[arg(long, value_enum)]
        area: Option<Area>,
        /// Only tasks with this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List tasks with optional filters.
    List {
        /// Case-insensitive text in name or description.
        #[arg(long)]
        search: Option<String>,
        /// Start month (1-12).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Owning area.
        #[arg(long, value_enum)]
        area: Option<Area>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortField::EndDate)]
        sort: SortField,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
        /// Page to show, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        json: bool,
    },

    /// View a single task by ID.
    View {
        /// Task ID to view
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Tasks of the current viewer (see --role and --area).
    Mine,

    /// Tasks shared between areas.
    Collab {
        /// Only tasks this area owns or supports.
        #[arg(long, value_enum)]
        area: Option<Area>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Current alerts, most urgent first.
    Notifications {
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the interactive dashboard over `store`.
pub fn cmd_ui(store: TaskStore) -> Result<()> {
    run_tui(store).context("UI error")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn cmd_dashboard(
    store: &TaskStore,
    month: Option<u32>,
    area: Option<Area>,
    status: Option<Status>,
    json: bool,
) -> Result<()> {
    let today = store.today();
    let filter = TaskFilter {
        month: month.map(|m| m - 1),
        area,
        status,
        ..Default::default()
    };
    let tasks: Vec<Task> = filter.apply(store.tasks(), today).into_iter().cloned().collect();
    let dash = dashboard(&tasks, today);

    if json {
        return print_json(&dash);
    }

    let k = &dash.kpis;
    println!("Dashboard for {}", format_date(today));
    println!(
        "Total: {}  Pending: {}  Progress: {}%  Avg duration: {} days",
        k.total, k.pending, k.overall_progress, k.avg_execution_days
    );
    for s in Status::ALL {
        println!("  {:<12} {}", format_status(s), k.by_status.get(s));
    }

    println!("\nCompletion by area:");
    for a in &dash.by_area {
        println!(
            "  {:<15} {} {:>3}%  {}/{} finished",
            a.area.label(),
            progress_bar(a.avg_progress, 10),
            a.avg_progress,
            a.finished_count,
            a.count
        );
    }

    println!("\nTasks by start month:");
    for b in dash.by_month.iter().filter(|b| b.total() > 0) {
        println!(
            "  {:<10} {:>3}  (planned {}, in progress {}, finished {}, overdue {})",
            month_name(b.month),
            b.total(),
            b.counts.planned,
            b.counts.in_progress,
            b.counts.finished,
            b.counts.overdue
        );
    }

    println!("\nOpen work by area ({} urgent this week):", dash.due.urgent);
    for (area, n) in &dash.due.by_area {
        println!("  {:<15} {}", area.label(), n);
    }

    println!("\nAverage duration by area (overall {} days):", dash.avg_area_days);
    for d in &dash.durations {
        println!("  {:<15} {:>4} days  ({} tasks)", d.area.label(), d.avg_days, d.count);
    }
    Ok(())
}

#[derive(Serialize)]
struct ListPage<'a> {
    page: usize,
    pages: usize,
    stats: ListStats,
    tasks: &'a [&'a Task],
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &TaskStore,
    search: Option<String>,
    month: Option<u32>,
    area: Option<Area>,
    status: Option<Status>,
    priority: Option<Priority>,
    sort: SortField,
    desc: bool,
    page: usize,
    json: bool,
) -> Result<()> {
    let today = store.today();
    let filter = TaskFilter {
        search,
        month: month.map(|m| m - 1),
        area,
        status,
        priority,
    };
    let mut rows = filter.apply(store.tasks(), today);
    let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
    sort_tasks(&mut rows, sort, direction, today);

    let stats = list_stats(&rows, today);
    let pages = page_count(rows.len());
    let shown = paginate(&rows, page);

    if json {
        return print_json(&ListPage { page, pages, stats, tasks: shown });
    }

    print_list_stats(&stats);
    if rows.is_empty() {
        println!("No tasks match.");
        return Ok(());
    }
    print_table(shown, today);
    if pages > 1 {
        let strip: Vec<String> = page_links(page, pages)
            .into_iter()
            .map(|l| match l {
                PageLink::Page(p) if p == page => format!("[{p}]"),
                PageLink::Page(p) => p.to_string(),
                PageLink::Ellipsis => "…".into(),
            })
            .collect();
        println!("Page {} of {}: {}", page, pages, strip.join(" "));
    }
    Ok(())
}

pub fn cmd_view(store: &TaskStore, id: String, json: bool) -> Result<()> {
    let Some(task) = store.get(&id) else {
        bail!("task {id} not found");
    };
    if json {
        return print_json(task);
    }

    let today = store.today();
    println!("ID:           {}", task.id);
    println!("Name:         {}", task.name);
    println!("Status:       {}", format_status(status_of(task, today)));
    println!("Priority:     {}", format_priority(task.priority));
    println!("Progress:     {} {}%", progress_bar(task.total_progress, 20), task.total_progress);
    println!("Areas:        {}", format_areas(&task.areas));
    println!(
        "Support:      {}",
        if task.requires_support { format_areas(&task.support_areas) } else { "-".into() }
    );
    println!("Start:        {}", format_date(task.start_date));
    println!(
        "End:          {} ({})",
        format_date(task.end_date),
        format_due_relative(task.end_date, today)
    );
    println!("Duration:     {} days", task.execution_days);
    println!("Created:      {} by {}", format_date(task.created_at), task.created_by);
    println!(
        "Description:\n{}\n",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );

    println!("Activities:");
    for a in &task.activities {
        let mark = if a.completed { "x" } else { " " };
        println!("  [{}] {:<30} {:>3}%  ({})", mark, a.name, a.percentage, a.id);
    }
    if !task.documents.is_empty() {
        println!("Documents:");
        for d in &task.documents {
            println!("  {} -> {}", d.name, d.reference);
        }
    }
    Ok(())
}

pub fn cmd_mine(store: &TaskStore) -> Result<()> {
    let today = store.today();
    let viewer = store.viewer();
    let primary = my_primary_tasks(store.tasks(), viewer, today);
    let shared = shared_with_me(store.tasks(), viewer, today);
    let stats = my_stats(&primary, today);

    match viewer {
        ViewerContext::Administrator => println!("All tasks (administrator)"),
        ViewerContext::AreaUser(area) => println!("Tasks of {}", area.label()),
    }
    println!(
        "In progress: {}  Due soon: {}  Overdue: {}",
        stats.in_progress, stats.due_soon, stats.overdue
    );
    if primary.is_empty() {
        println!("No tasks.");
    } else {
        print_table(&primary, today);
    }

    if !shared.is_empty() {
        println!("\nShared with me:");
        print_table(&shared, today);
    }
    Ok(())
}

pub fn cmd_collab(store: &TaskStore, area: Option<Area>, status: Option<Status>) -> Result<()> {
    let today = store.today();
    let all = collaborative_tasks(store.tasks());
    let rows = filter_collaborative(&all, area, status, today);
    let stats = collab_stats(&rows, today);

    println!(
        "Collaborative: {}  In progress: {}  Finished: {}  Overdue: {}  Avg progress: {}%",
        stats.total, stats.in_progress, stats.finished, stats.overdue, stats.avg_progress
    );
    for t in rows {
        println!(
            "  {:<12} {:<28} {:<12} owners: {:<30} support: {}",
            truncate(&t.id, 12),
            truncate(&t.name, 28),
            format_status(status_of(t, today)),
            format_areas(&t.areas),
            format_areas(&t.support_areas)
        );
    }
    Ok(())
}

pub fn cmd_notifications(store: &TaskStore, json: bool) -> Result<()> {
    let notifications = store.notifications();
    if json {
        return print_json(notifications);
    }
    if notifications.is_empty() {
        println!("No alerts.");
        return Ok(());
    }

    let today = store.today();
    println!("{} alerts, {} unread", notifications.len(), store.unread_count());
    for n in notifications {
        let due = store
            .get(&n.task_id)
            .map(|t| days_remaining(t.end_date, today))
            .unwrap_or_default();
        println!(
            "{} [{:<6}] {}  ({}, {}d)",
            if n.read { " " } else { "*" },
            format_priority(n.priority),
            n.message,
            n.task_id,
            due
        );
    }
    Ok(())
}

/// Generate shell completions.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
