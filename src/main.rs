//! `tareas` binary.
//!
//! ```bash
//! # KPIs over the demo seed
//! tareas dashboard
//!
//! # Overdue high-priority work, as JSON
//! tareas list --status overdue --priority high --json
//!
//! # What the Legal area is responsible for
//! tareas mine --role user --area legal
//!
//! # Interactive dashboard over a seed file
//! tareas ui --seed tasks.json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tareas::cli::Cli;
use tareas::cmd::*;
use tareas::fields::ViewerContext;
use tareas::seed::{builtin_seed, load_seed, parse_today};
use tareas::status::{Clock, FixedClock, SystemClock};
use tareas::store::TaskStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Completions need no store.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return Ok(());
    }

    let clock: Box<dyn Clock> = match cli.today.as_deref() {
        Some(s) => Box::new(FixedClock(parse_today(s)?)),
        None => Box::new(SystemClock),
    };
    let seed = match cli.seed.as_deref() {
        Some(path) => load_seed(path)?,
        None => builtin_seed(clock.today()),
    };
    let viewer = ViewerContext::from_role(cli.role, cli.area);
    let store = TaskStore::new(seed, viewer, clock);

    match cli.command {
        Commands::Ui => cmd_ui(store),

        Commands::Dashboard { month, area, status, json } =>
            cmd_dashboard(&store, month, area, status, json),

        Commands::List { search, month, area, status, priority, sort, desc, page, json } =>
            cmd_list(&store, search, month, area, status, priority, sort, desc, page, json),

        Commands::View { id, json } => cmd_view(&store, id, json),

        Commands::Mine => cmd_mine(&store),

        Commands::Collab { area, status } => cmd_collab(&store, area, status),

        Commands::Notifications { json } => cmd_notifications(&store, json),

        Commands::Completions { .. } => Ok(()),
    }
}
