//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Main,
    TaskDetail,
    AddTask,
    Help,
    Confirm,
}

/// Input mode for text entry fields.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputMode {
    None,
    Search,
}

/// Top-level views of the dashboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Dashboard,
    Tasks,
    MyTasks,
    Collaborative,
    Notifications,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Tasks,
        Tab::MyTasks,
        Tab::Collaborative,
        Tab::Notifications,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Tasks => "Tasks",
            Tab::MyTasks => "My Tasks",
            Tab::Collaborative => "Collaborative",
            Tab::Notifications => "Notifications",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Whether the tab shows a selectable list of tasks.
    pub fn lists_tasks(self) -> bool {
        matches!(self, Tab::Tasks | Tab::MyTasks | Tab::Collaborative)
    }
}
