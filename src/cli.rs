use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::{Area, Role};

/// Operational task-tracking dashboard.
/// Starts from a JSON seed file (or the builtin demo seed); nothing is saved.
#[derive(Parser)]
#[command(name = "tareas", version, about = "Task-tracking dashboard with KPIs and alerts")]
pub struct Cli {
    /// Path to a JSON seed file. The builtin demo seed is used when absent.
    #[arg(long, global = true, env = "TAREAS_SEED")]
    pub seed: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long, global = true, env = "TAREAS_TODAY")]
    pub today: Option<String>,

    /// Viewer role: admin sees every task as its own.
    #[arg(long, global = true, value_enum, env = "TAREAS_ROLE", default_value_t = Role::Admin)]
    pub role: Role,

    /// Viewer area, used with `--role user`.
    #[arg(long, global = true, value_enum, env = "TAREAS_AREA", default_value_t = Area::Seguridad)]
    pub area: Area,

    #[command(subcommand)]
    pub command: Commands,
}
