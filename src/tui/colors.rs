//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, Status};
use crate::query::Highlight;

/// Header and status bar background.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Selected form field and warnings.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Overdue work and destructive confirmations.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const SKY: Color = Color::Rgb(80, 160, 220);

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Planned => SKY,
        Status::InProgress => GOLD,
        Status::Finished => Color::Green,
        Status::Overdue => Color::Red,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => GOLD,
        Priority::Low => Color::Gray,
    }
}

/// Row foreground for a highlighted task.
pub fn highlight_color(highlight: Option<Highlight>) -> Color {
    match highlight {
        Some(Highlight::Critical) => Color::Red,
        Some(Highlight::Warning) => GOLD,
        None => Color::White,
    }
}
