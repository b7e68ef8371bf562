//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store for the
//! session, handles user input, renders the tabs and coordinates between the
//! screens (tabs, task detail, new-task form, dialogs). All writes go through
//! the store; the app only keeps view state.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::fields::*;
use crate::format::*;
use crate::kpi::{dashboard, list_stats};
use crate::query::*;
use crate::status::{days_remaining, status_of};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::{
    colors::{highlight_color, priority_color, status_color, DARK_GREEN, DARK_RED, GOLD},
    enums::{AppState, InputMode, Tab},
    task_form::{
        AreaPicker, TaskForm, ACTIVITIES_GLOBAL_ORDER, AREAS_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER,
        END_GLOBAL_ORDER, NAME_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER, START_GLOBAL_ORDER,
        SUPPORT_GLOBAL_ORDER,
    },
    utils::centered_rect,
};

const MONTH_INDICES: [u32; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// Step an optional filter through `all`, then back to "any".
fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(v) => {
            let pos = all.iter().position(|&x| x == v).unwrap_or(all.len());
            all.get(pos + 1).copied()
        }
    }
}

fn or_any<T>(value: Option<T>, f: impl Fn(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| "Any".into())
}

fn short_label(area: Area) -> &'static str {
    area.label().get(..4).unwrap_or(area.label())
}

/// Table rows for a task list. Cells own their text so the rows outlive the
/// borrow of the store.
fn task_rows(tasks: &[&Task], today: chrono::NaiveDate) -> Vec<Row<'static>> {
    tasks
        .iter()
        .map(|t| {
            let status = status_of(t, today);
            let fg = if status == Status::Finished {
                Color::DarkGray
            } else {
                highlight_color(row_highlight(t, today))
            };
            Row::new(vec![
                Cell::from(t.id.clone()),
                Cell::from(t.name.clone()),
                Cell::from(format_status(status)).style(Style::default().fg(status_color(status))),
                Cell::from(format_priority(t.priority)).style(Style::default().fg(priority_color(t.priority))),
                Cell::from(format!("{} {:>3}%", progress_bar(t.total_progress, 8), t.total_progress)),
                Cell::from(format_date(t.end_date)),
                Cell::from(format_due_relative(t.end_date, today)),
                Cell::from(format_areas(&t.areas)),
            ])
            .style(Style::default().fg(fg))
        })
        .collect()
}

const TASK_HEADER: [&str; 8] = ["ID", "Name", "Status", "Priority", "Progress", "End", "Due", "Areas"];

fn task_widths() -> [Constraint; 8] {
    [
        Constraint::Length(10),
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(9),
        Constraint::Length(28),
    ]
}

fn header_row(cells: &[&'static str]) -> Row<'static> {
    Row::new(
        cells
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(DARK_GREEN).fg(Color::White))
    .height(1)
}

/// Main application state for the terminal user interface.
pub struct App {
    store: TaskStore,
    state: AppState,
    tab: Tab,
    input_mode: InputMode,
    table_state: TableState,
    list_filter: TaskFilter,
    dash_filter: TaskFilter,
    sort: SortField,
    direction: SortDirection,
    page: usize,
    collab_area: Option<Area>,
    collab_status: Option<Status>,
    selected_task: Option<String>,
    activity_cursor: usize,
    task_form: TaskForm,
    /// Area used when switching to the area-user role.
    user_area: Area,
    status_message: String,
    confirm_action: Option<String>,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let today = store.today();
        let user_area = store.viewer().area().unwrap_or(Area::Seguridad);
        App {
            store,
            state: AppState::Main,
            tab: Tab::Dashboard,
            input_mode: InputMode::None,
            table_state: TableState::default(),
            list_filter: TaskFilter::default(),
            dash_filter: TaskFilter::default(),
            sort: SortField::EndDate,
            direction: SortDirection::Asc,
            page: 1,
            collab_area: None,
            collab_status: None,
            selected_task: None,
            activity_cursor: 0,
            task_form: TaskForm::new(today),
            user_area,
            status_message: String::new(),
            confirm_action: None,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Filtered and sorted rows of the task list, all pages.
    fn list_rows(&self) -> Vec<&Task> {
        let today = self.store.today();
        let mut rows = self.list_filter.apply(self.store.tasks(), today);
        sort_tasks(&mut rows, self.sort, self.direction, today);
        rows
    }

    fn my_rows(&self) -> (Vec<&Task>, Vec<&Task>) {
        let today = self.store.today();
        let viewer = self.store.viewer();
        (
            my_primary_tasks(self.store.tasks(), viewer, today),
            shared_with_me(self.store.tasks(), viewer, today),
        )
    }

    fn collab_rows(&self) -> Vec<&Task> {
        let all = collaborative_tasks(self.store.tasks());
        filter_collaborative(&all, self.collab_area, self.collab_status, self.store.today())
    }

    /// Ids behind the rows of the current tab, in display order.
    fn row_ids(&self) -> Vec<String> {
        let ids = |tasks: &[&Task]| tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        match self.tab {
            Tab::Dashboard => Vec::new(),
            Tab::Tasks => ids(paginate(&self.list_rows(), self.page)),
            Tab::MyTasks => {
                let (mut primary, shared) = self.my_rows();
                primary.extend(shared);
                ids(&primary)
            }
            Tab::Collaborative => ids(&self.collab_rows()),
            Tab::Notifications => self.store.notifications().iter().map(|n| n.id.clone()).collect(),
        }
    }

    fn selected_row(&self) -> Option<String> {
        let i = self.table_state.selected()?;
        self.row_ids().into_iter().nth(i)
    }

    fn select_first(&mut self) {
        let empty = self.row_ids().is_empty();
        self.table_state.select(if empty { None } else { Some(0) });
    }

    fn clamp_selection(&mut self) {
        let n = self.row_ids().len();
        match self.table_state.selected() {
            _ if n == 0 => self.table_state.select(None),
            Some(i) if i >= n => self.table_state.select(Some(n - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    fn move_selection(&mut self, down: bool) {
        let n = self.row_ids().len();
        if n == 0 {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0);
        let next = if down { (i + 1).min(n - 1) } else { i.saturating_sub(1) };
        self.table_state.select(Some(next));
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.input_mode = InputMode::None;
        self.select_first();
    }

    fn open_detail(&mut self, task_id: String) {
        self.selected_task = Some(task_id);
        self.activity_cursor = 0;
        self.state = AppState::TaskDetail;
    }

    fn selected_detail_task(&self) -> Option<&Task> {
        self.selected_task.as_deref().and_then(|id| self.store.get(id))
    }

    fn toggle_role(&mut self) {
        let viewer = match self.store.viewer() {
            ViewerContext::Administrator => ViewerContext::AreaUser(self.user_area),
            ViewerContext::AreaUser(_) => ViewerContext::Administrator,
        };
        self.store.set_viewer(viewer);
        self.set_status_message(format!("Viewing as {}", viewer.creator_label()));
        self.select_first();
    }

    fn cycle_user_area(&mut self) {
        let i = Area::ALL.iter().position(|&a| a == self.user_area).unwrap_or(0);
        self.user_area = Area::ALL[(i + 1) % Area::ALL.len()];
        if let ViewerContext::AreaUser(_) = self.store.viewer() {
            self.store.set_viewer(ViewerContext::AreaUser(self.user_area));
        }
        self.set_status_message(format!("Area: {}", self.user_area.label()));
        self.select_first();
    }

    /// Filter being edited on the current tab, if it has one.
    fn tab_filter_mut(&mut self) -> Option<&mut TaskFilter> {
        match self.tab {
            Tab::Tasks => Some(&mut self.list_filter),
            Tab::Dashboard => Some(&mut self.dash_filter),
            _ => None,
        }
    }

    fn after_filter_change(&mut self) {
        self.page = 1;
        self.select_first();
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.list_filter.search = None;
                self.input_mode = InputMode::None;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::None;
                let n = self.list_rows().len();
                self.set_status_message(format!("{n} tasks match"));
            }
            KeyCode::Backspace => {
                if let Some(s) = self.list_filter.search.as_mut() {
                    s.pop();
                    if s.is_empty() {
                        self.list_filter.search = None;
                    }
                }
            }
            KeyCode::Char(c) => self.list_filter.search.get_or_insert_with(String::new).push(c),
            _ => return,
        }
        self.after_filter_change();
    }

    /// Handle keyboard input on the tab views.
    ///
    /// Returns true if the application should quit.
    fn handle_main_input(&mut self, key: KeyEvent) -> bool {
        if self.input_mode == InputMode::Search {
            self.handle_search_input(key);
            return false;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.switch_tab(Tab::ALL[idx]);
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Left if self.tab == Tab::Tasks => {
                if self.page > 1 {
                    self.page -= 1;
                    self.select_first();
                }
            }
            KeyCode::Right if self.tab == Tab::Tasks => {
                if self.page < page_count(self.list_rows().len()) {
                    self.page += 1;
                    self.select_first();
                }
            }
            KeyCode::Enter => match self.tab {
                Tab::Notifications => {
                    if let Some(id) = self.selected_row() {
                        match self.store.mark_notification_read(&id) {
                            Ok(()) => self.set_status_message("Marked as read"),
                            Err(e) => self.set_status_message(e.to_string()),
                        }
                    }
                }
                tab if tab.lists_tasks() => {
                    if let Some(id) = self.selected_row() {
                        self.open_detail(id);
                    }
                }
                _ => {}
            },
            KeyCode::Char('v') if self.tab == Tab::Notifications => {
                let task_id = self.selected_row().and_then(|id| {
                    self.store
                        .notifications()
                        .iter()
                        .find(|n| n.id == id)
                        .map(|n| n.task_id.clone())
                });
                if let Some(task_id) = task_id {
                    self.open_detail(task_id);
                }
            }
            KeyCode::Char('a') => {
                let mut form = TaskForm::new(self.store.today());
                if let Some(area) = self.store.viewer().area() {
                    form = form.with_owner(area);
                }
                self.task_form = form;
                self.state = AppState::AddTask;
            }
            KeyCode::Char('r') => self.toggle_role(),
            KeyCode::Char('u') => self.cycle_user_area(),
            KeyCode::Char('/') if self.tab == Tab::Tasks => {
                self.input_mode = InputMode::Search;
                self.list_filter.search.get_or_insert_with(String::new);
            }
            KeyCode::Char('s') if self.tab == Tab::Tasks => {
                let i = SortField::ALL.iter().position(|&f| f == self.sort).unwrap_or(0);
                self.sort = SortField::ALL[(i + 1) % SortField::ALL.len()];
                self.select_first();
            }
            KeyCode::Char('o') if self.tab == Tab::Tasks => {
                self.direction = self.direction.flipped();
                self.select_first();
            }
            KeyCode::Char('p') if self.tab == Tab::Tasks => {
                self.list_filter.priority = cycle(self.list_filter.priority, &Priority::ALL);
                self.after_filter_change();
            }
            KeyCode::Char('f') => {
                if self.tab == Tab::Collaborative {
                    self.collab_status = cycle(self.collab_status, &Status::ALL);
                } else if let Some(filter) = self.tab_filter_mut() {
                    filter.status = cycle(filter.status, &Status::ALL);
                }
                self.after_filter_change();
            }
            KeyCode::Char('g') => {
                if self.tab == Tab::Collaborative {
                    self.collab_area = cycle(self.collab_area, &Area::ALL);
                } else if let Some(filter) = self.tab_filter_mut() {
                    filter.area = cycle(filter.area, &Area::ALL);
                }
                self.after_filter_change();
            }
            KeyCode::Char('m') => {
                if let Some(filter) = self.tab_filter_mut() {
                    filter.month = cycle(filter.month, &MONTH_INDICES);
                }
                self.after_filter_change();
            }
            KeyCode::Char('x') => {
                match self.tab {
                    Tab::Collaborative => {
                        self.collab_area = None;
                        self.collab_status = None;
                    }
                    _ => {
                        if let Some(filter) = self.tab_filter_mut() {
                            *filter = TaskFilter::default();
                        }
                    }
                }
                self.set_status_message("Filters cleared");
                self.after_filter_change();
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Handle keyboard input on the task detail view.
    fn handle_detail_input(&mut self, key: KeyEvent) -> bool {
        let Some(task) = self.selected_detail_task() else {
            self.state = AppState::Main;
            return false;
        };
        let task_id = task.id.clone();
        let activity_count = task.activities.len();
        let finished = task.total_progress == 100;
        let activity = task
            .activities
            .get(self.activity_cursor)
            .map(|a| (a.id.clone(), a.completed));
        let name = task.name.clone();

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::Main,
            KeyCode::Up | KeyCode::Char('k') => {
                self.activity_cursor = self.activity_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.activity_cursor + 1 < activity_count {
                    self.activity_cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some((activity_id, completed)) = activity {
                    match self.store.set_activity_completed(&task_id, &activity_id, !completed) {
                        Ok(()) => {
                            if let Some(t) = self.store.get(&task_id) {
                                let msg = format!(
                                    "Progress {}% - {}",
                                    t.total_progress,
                                    format_status(status_of(t, self.store.today()))
                                );
                                self.set_status_message(msg);
                            }
                        }
                        Err(e) => self.set_status_message(e.to_string()),
                    }
                }
            }
            KeyCode::Char('f') => {
                if finished {
                    self.set_status_message("Task is already finished");
                } else {
                    self.confirm_action = Some(format!("Finalize \"{name}\""));
                    self.state = AppState::Confirm;
                }
            }
            _ => {}
        }
        false
    }

    /// Handle keyboard input in the new-task form.
    fn handle_form_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.state = AppState::Main,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.create_task(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    fn create_task(&mut self) {
        let new = match self.task_form.to_new_task(self.store.today()) {
            Ok(new) => new,
            Err(msg) => {
                self.set_status_message(msg);
                return;
            }
        };
        match self.store.add_task(new) {
            Ok(id) => {
                self.set_status_message(format!("Created task {id}"));
                self.state = AppState::Main;
                self.select_first();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn handle_confirm_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.selected_task.clone() {
                    match self.store.finalize_task(&id) {
                        Ok(()) => self.set_status_message(format!("Task {id} finalized")),
                        Err(e) => self.set_status_message(e.to_string()),
                    }
                }
                self.state = AppState::TaskDetail;
                self.confirm_action = None;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskDetail;
                self.confirm_action = None;
            }
            _ => {}
        }
        false
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::Main => self.handle_main_input(key),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::AddTask => self.handle_form_input(key),
            AppState::Help => {
                self.state = AppState::Main;
                false
            }
            AppState::Confirm => self.handle_confirm_input(key),
        }
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<String> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| match t {
                Tab::Notifications => format!("{} {} ({})", i + 1, t.title(), self.store.unread_count()),
                _ => format!("{} {}", i + 1, t.title()),
            })
            .collect();
        let title = format!(
            " TAREAS  {}  viewer: {} ",
            format_date(self.store.today()),
            self.store.viewer().creator_label()
        );
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_dashboard(&self, f: &mut Frame, area: Rect) {
        let today = self.store.today();
        let tasks: Vec<Task> = self
            .dash_filter
            .apply(self.store.tasks(), today)
            .into_iter()
            .cloned()
            .collect();
        let dash = dashboard(&tasks, today);
        let k = &dash.kpis;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Min(8),
            ])
            .split(area);

        let filter_line = format!(
            "Month: {}  Area: {}  Status: {}   (m/g/f to filter, x to clear)",
            or_any(self.dash_filter.month, |m| month_name(m).to_string()),
            or_any(self.dash_filter.area, |a| a.label().to_string()),
            or_any(self.dash_filter.status, |s| format_status(s).to_string()),
        );
        f.render_widget(Paragraph::new(filter_line).style(Style::default().fg(Color::Cyan)), rows[0]);

        let kpi_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(rows[1]);
        let kpi = |label: &str, value: String| {
            Paragraph::new(vec![
                Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(label.to_string()))
        };
        f.render_widget(kpi("Total tasks", k.total.to_string()), kpi_cols[0]);
        f.render_widget(kpi("Pending", k.pending.to_string()), kpi_cols[1]);
        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Overall progress"))
                .gauge_style(Style::default().fg(Color::Green))
                .percent(u16::from(k.overall_progress.min(100))),
            kpi_cols[2],
        );
        f.render_widget(kpi("Avg duration", format!("{} days", k.avg_execution_days)), kpi_cols[3]);

        let mid = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[2]);
        let status_data: Vec<(&str, u64)> = Status::ALL
            .iter()
            .map(|&s| (format_status(s), k.by_status.get(s) as u64))
            .collect();
        f.render_widget(
            BarChart::default()
                .block(Block::default().borders(Borders::ALL).title("By status"))
                .data(status_data.as_slice())
                .bar_width(8)
                .bar_gap(1)
                .bar_style(Style::default().fg(GOLD)),
            mid[0],
        );
        let area_data: Vec<(&str, u64)> = dash
            .by_area
            .iter()
            .map(|a| (short_label(a.area), u64::from(a.avg_progress.min(100))))
            .collect();
        f.render_widget(
            BarChart::default()
                .block(Block::default().borders(Borders::ALL).title("Completion by area (%)"))
                .data(area_data.as_slice())
                .bar_width(5)
                .bar_gap(1)
                .max(100)
                .bar_style(Style::default().fg(Color::Green)),
            mid[1],
        );

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[3]);
        let month_data: Vec<(&str, u64)> = dash
            .by_month
            .iter()
            .map(|b| (month_name(b.month).get(..3).unwrap_or("-"), b.total() as u64))
            .collect();
        f.render_widget(
            BarChart::default()
                .block(Block::default().borders(Borders::ALL).title("Tasks by start month"))
                .data(month_data.as_slice())
                .bar_width(3)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan)),
            bottom[0],
        );

        let mut lines = vec![Line::from(Span::styled(
            format!("Open work by area ({} urgent this week)", dash.due.urgent),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (a, n) in &dash.due.by_area {
            lines.push(Line::from(format!("  {:<15} {}", a.label(), n)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Avg duration by area (overall {} days)", dash.avg_area_days),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for d in &dash.durations {
            lines.push(Line::from(format!("  {:<15} {} days", d.area.label(), d.avg_days)));
        }
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Deadlines")),
            bottom[1],
        );
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = self.store.today();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let all = self.list_rows();
        let stats = list_stats(&all, today);
        let pages = page_count(all.len());
        let rows = task_rows(paginate(&all, self.page), today);

        let arrow = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        let search = self.list_filter.search.clone().unwrap_or_default();
        let header_lines = vec![
            Line::from(format!(
                "Search: {}  Month: {}  Area: {}  Status: {}  Priority: {}  Sort: {:?} {}",
                if search.is_empty() { "-" } else { search.as_str() },
                or_any(self.list_filter.month, |m| month_name(m).to_string()),
                or_any(self.list_filter.area, |a| a.label().to_string()),
                or_any(self.list_filter.status, |s| format_status(s).to_string()),
                or_any(self.list_filter.priority, |p| format_priority(p).to_string()),
                self.sort,
                arrow,
            )),
            Line::from(format!(
                "Tasks: {}  Finished: {}  Overdue: {}  Avg progress: {}%",
                stats.total, stats.finished, stats.overdue, stats.avg_progress
            )),
        ];
        f.render_widget(
            Paragraph::new(header_lines).block(Block::default().borders(Borders::ALL).title("Filters")),
            chunks[0],
        );

        let strip: Vec<Span> = page_links(self.page, pages)
            .into_iter()
            .map(|l| match l {
                PageLink::Page(p) if p == self.page => {
                    Span::styled(format!(" {p} "), Style::default().bg(GOLD).fg(Color::Black))
                }
                PageLink::Page(p) => Span::raw(format!(" {p} ")),
                PageLink::Ellipsis => Span::raw(" … "),
            })
            .collect();

        let table = Table::new(rows, task_widths())
            .header(header_row(&TASK_HEADER))
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                stats.total,
                self.store.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
        f.render_widget(Paragraph::new(Line::from(strip)).alignment(Alignment::Center), chunks[2]);
    }

    fn render_my_tasks(&mut self, f: &mut Frame, area: Rect) {
        let today = self.store.today();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let (primary, shared) = self.my_rows();
        let stats = my_stats(&primary, today);
        let shared_count = shared.len();
        let mut rows = task_rows(&primary, today);
        rows.extend(
            task_rows(&shared, today)
                .into_iter()
                .map(|r| r.style(Style::default().fg(Color::Cyan))),
        );

        let who = match self.store.viewer() {
            ViewerContext::Administrator => "All tasks (administrator)".to_string(),
            ViewerContext::AreaUser(a) => format!("Tasks of {} ({} shared, in cyan)", a.label(), shared_count),
        };
        f.render_widget(
            Paragraph::new(format!(
                "In progress: {}  Due soon: {}  Overdue: {}   r: toggle role  u: change area",
                stats.in_progress, stats.due_soon, stats.overdue
            ))
            .block(Block::default().borders(Borders::ALL).title(who)),
            chunks[0],
        );

        let table = Table::new(rows, task_widths())
            .header(header_row(&TASK_HEADER))
            .block(Block::default().borders(Borders::ALL).title("My tasks, soonest deadline first"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn render_collaborative(&mut self, f: &mut Frame, area: Rect) {
        let today = self.store.today();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let tasks = self.collab_rows();
        let stats = collab_stats(&tasks, today);
        let rows: Vec<Row> = tasks
            .iter()
            .map(|t| {
                let status = status_of(t, today);
                Row::new(vec![
                    Cell::from(t.id.clone()),
                    Cell::from(t.name.clone()),
                    Cell::from(format_status(status)).style(Style::default().fg(status_color(status))),
                    Cell::from(format!("{:>3}%", t.total_progress)),
                    Cell::from(format_areas(&t.areas)),
                    Cell::from(format_areas(&t.support_areas)),
                ])
            })
            .collect();

        f.render_widget(
            Paragraph::new(vec![
                Line::from(format!(
                    "Total: {}  In progress: {}  Finished: {}  Overdue: {}  Avg progress: {}%",
                    stats.total, stats.in_progress, stats.finished, stats.overdue, stats.avg_progress
                )),
                Line::from(format!(
                    "Area: {}  Status: {}   (g/f to filter, x to clear)",
                    or_any(self.collab_area, |a| a.label().to_string()),
                    or_any(self.collab_status, |s| format_status(s).to_string()),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).title("Collaborative work")),
            chunks[0],
        );

        let widths = [
            Constraint::Length(10),
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(30),
            Constraint::Length(30),
        ];
        let table = Table::new(rows, widths)
            .header(header_row(&["ID", "Name", "Status", "Prog", "Owners", "Support"]))
            .block(Block::default().borders(Borders::ALL))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn render_notifications(&mut self, f: &mut Frame, area: Rect) {
        let today = self.store.today();
        let rows: Vec<Row> = self
            .store
            .notifications()
            .iter()
            .map(|n| {
                let due = self
                    .store
                    .get(&n.task_id)
                    .map(|t| format_due_relative(t.end_date, today))
                    .unwrap_or_default();
                let style = if n.read {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(priority_color(n.priority)).add_modifier(Modifier::BOLD)
                };
                Row::new(vec![
                    Cell::from(if n.read { " " } else { "●" }),
                    Cell::from(format_priority(n.priority)),
                    Cell::from(n.message.clone()),
                    Cell::from(n.task_id.clone()),
                    Cell::from(due),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Min(40),
            Constraint::Length(10),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .header(header_row(&["", "Priority", "Message", "Task", "Due"]))
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Alerts ({} unread) - Enter: mark read  v: open task",
                self.store.unread_count()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    /// Render the detailed view of a single task.
    fn render_task_detail(&self, f: &mut Frame, area: Rect) {
        let Some(task) = self.selected_detail_task() else {
            f.render_widget(
                Paragraph::new("Task not found").block(Block::default().borders(Borders::ALL)),
                area,
            );
            return;
        };
        let today = self.store.today();
        let status = status_of(task, today);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(5), Constraint::Length(5)])
            .split(area);

        let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::BOLD));
        let info = vec![
            Line::from(vec![label("Status:      "), Span::styled(format_status(status), Style::default().fg(status_color(status)))]),
            Line::from(vec![label("Priority:    "), Span::styled(format_priority(task.priority), Style::default().fg(priority_color(task.priority)))]),
            Line::from(vec![label("Areas:       "), Span::raw(format_areas(&task.areas))]),
            Line::from(vec![
                label("Support:     "),
                Span::raw(if task.requires_support { format_areas(&task.support_areas) } else { "-".into() }),
            ]),
            Line::from(vec![
                label("Dates:       "),
                Span::raw(format!(
                    "{} - {} ({}, {} days remaining)",
                    format_date(task.start_date),
                    format_date(task.end_date),
                    format_due_relative(task.end_date, today),
                    days_remaining(task.end_date, today)
                )),
            ]),
            Line::from(vec![label("Duration:    "), Span::raw(format!("{} days", task.execution_days))]),
            Line::from(vec![label("Created:     "), Span::raw(format!("{} by {}", format_date(task.created_at), task.created_by))]),
            Line::from(vec![label("Description: "), Span::raw(if task.description.is_empty() { "-".to_string() } else { task.description.clone() })]),
        ];
        f.render_widget(
            Paragraph::new(info)
                .block(Block::default().borders(Borders::ALL).title(format!("{} - {}", task.id, task.name)))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let act_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(chunks[1]);
        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Progress"))
                .gauge_style(Style::default().fg(status_color(status)))
                .percent(u16::from(task.total_progress.min(100))),
            act_chunks[0],
        );
        let rows: Vec<Row> = task
            .activities
            .iter()
            .map(|a| {
                let style = if a.completed {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(if a.completed { "[x]" } else { "[ ]" }),
                    Cell::from(a.name.clone()),
                    Cell::from(format!("{:>3}%", a.percentage)),
                ])
                .style(style)
            })
            .collect();
        let mut state = TableState::default();
        if !task.activities.is_empty() {
            state.select(Some(self.activity_cursor.min(task.activities.len() - 1)));
        }
        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20), Constraint::Length(5)])
            .block(Block::default().borders(Borders::ALL).title("Activities - Space: toggle  f: finalize  Esc: back"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, act_chunks[1], &mut state);

        let docs: Vec<Line> = if task.documents.is_empty() {
            vec![Line::from("-")]
        } else {
            task.documents
                .iter()
                .map(|d| Line::from(format!("{} -> {}", d.name, d.reference)))
                .collect()
        };
        f.render_widget(
            Paragraph::new(docs).block(Block::default().borders(Borders::ALL).title("Documents")),
            chunks[2],
        );
    }

    fn render_area_picker(picker: &AreaPicker, focused: bool) -> Line<'static> {
        let spans: Vec<Span> = Area::ALL
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let mark = if picker.selected[i] { "[x]" } else { "[ ]" };
                let style = if focused && i == picker.cursor {
                    Style::default().bg(GOLD).fg(Color::Black)
                } else {
                    Style::default()
                };
                Span::styled(format!("{} {}  ", mark, a.label()), style)
            })
            .collect();
        Line::from(spans)
    }

    /// Render the new-task form.
    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let form = &self.task_form;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(3), // Description
                Constraint::Length(3), // Start / End
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Areas
                Constraint::Length(3), // Support
                Constraint::Length(3), // Activities
                Constraint::Min(1),    // Instructions
            ])
            .split(area);
        let dates = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let border = |idx: usize| {
            if form.current_field == idx {
                Style::default().fg(GOLD)
            } else {
                Style::default()
            }
        };
        let boxed = |title: &'static str, idx: usize| {
            Block::default().borders(Borders::ALL).title(title).border_style(border(idx))
        };

        let text_fields = [
            (&form.name, "Name *", NAME_GLOBAL_ORDER, chunks[0]),
            (&form.description, "Description", DESCRIPTION_GLOBAL_ORDER, chunks[1]),
            (&form.start, "Start date * (YYYY-MM-DD, today, in 3d)", START_GLOBAL_ORDER, dates[0]),
            (&form.end, "End date *", END_GLOBAL_ORDER, dates[1]),
            (&form.activities, "Activities * (comma-separated)", ACTIVITIES_GLOBAL_ORDER, chunks[6]),
        ];
        for (field, title, idx, rect) in text_fields {
            f.render_widget(Paragraph::new(field.value.as_str()).block(boxed(title, idx)), rect);
            if field.active {
                let x = rect.x + 1 + (field.cursor as u16).min(rect.width.saturating_sub(3));
                f.set_cursor_position((x, rect.y + 1));
            }
        }

        f.render_widget(
            Paragraph::new(format!("< {} >", format_priority(form.selected_priority())))
                .block(boxed("Priority", PRIORITY_GLOBAL_ORDER)),
            chunks[3],
        );
        f.render_widget(
            Paragraph::new(Self::render_area_picker(&form.areas, form.current_field == AREAS_GLOBAL_ORDER))
                .block(boxed("Owning areas * (arrows + Space)", AREAS_GLOBAL_ORDER)),
            chunks[4],
        );
        f.render_widget(
            Paragraph::new(Self::render_area_picker(&form.support, form.current_field == SUPPORT_GLOBAL_ORDER))
                .block(boxed("Support areas", SUPPORT_GLOBAL_ORDER)),
            chunks[5],
        );
        f.render_widget(
            Paragraph::new("Tab/Shift+Tab: move between fields   Enter: create task   Esc: cancel")
                .alignment(Alignment::Center),
            chunks[7],
        );
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = |s: &'static str| Line::from(Span::styled(s, Style::default().add_modifier(Modifier::BOLD)));
        let help_text = vec![
            bold("Task Dashboard Help"),
            Line::from(""),
            bold("Everywhere:"),
            Line::from("  Tab/Shift+Tab, 1-5  Switch tab"),
            Line::from("  ↑/k, ↓/j            Move selection"),
            Line::from("  Enter               Open task / mark alert read"),
            Line::from("  a                   New task"),
            Line::from("  r                   Toggle administrator / area user"),
            Line::from("  u                   Change area of the area user"),
            Line::from("  h/F1                Show this help"),
            Line::from("  q/Esc/Ctrl+C        Quit"),
            Line::from(""),
            bold("Dashboard, Tasks, Collaborative:"),
            Line::from("  m / g / f           Cycle month / area / status filter"),
            Line::from("  x                   Clear filters"),
            Line::from(""),
            bold("Tasks:"),
            Line::from("  /                   Search name and description"),
            Line::from("  p                   Cycle priority filter"),
            Line::from("  s / o               Cycle sort column / flip order"),
            Line::from("  ←/→                 Previous / next page"),
            Line::from(""),
            bold("Task detail:"),
            Line::from("  Space/Enter         Toggle the selected activity"),
            Line::from("  f                   Finalize task"),
            Line::from("  Esc/q               Back"),
            Line::from(""),
            bold("Notifications:"),
            Line::from("  v                   Open the task of the alert"),
        ];
        f.render_widget(
            Paragraph::new(help_text)
                .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    /// Render a confirmation dialog for finalizing a task.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(self.confirm_action.clone().unwrap_or_default()),
            Line::from(""),
            Line::from("Every activity will be marked complete."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        f.render_widget(
            Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.input_mode == InputMode::Search {
            format!(
                "Search: {} (Esc to clear, Enter to confirm)",
                self.list_filter.search.as_deref().unwrap_or("")
            )
        } else {
            match self.state {
                AppState::Main => format!(
                    "{} | {} unread alerts | Press 'h' for help",
                    self.tab.title(),
                    self.store.unread_count()
                ),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        f.render_widget(
            Paragraph::new(status_text)
                .style(Style::default().bg(DARK_GREEN).fg(Color::White))
                .alignment(Alignment::Left),
            area,
        );
    }

    /// Main render function that dispatches to appropriate view renderers.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.state {
            AppState::Main => {
                self.clamp_selection();
                match self.tab {
                    Tab::Dashboard => self.render_dashboard(f, chunks[1]),
                    Tab::Tasks => self.render_task_list(f, chunks[1]),
                    Tab::MyTasks => self.render_my_tasks(f, chunks[1]),
                    Tab::Collaborative => self.render_collaborative(f, chunks[1]),
                    Tab::Notifications => self.render_notifications(f, chunks[1]),
                }
            }
            AppState::TaskDetail => self.render_task_detail(f, chunks[1]),
            AppState::AddTask => self.render_task_form(f, chunks[1]),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::Confirm => {
                self.render_task_detail(f, chunks[1]);
                self.render_confirm(f, chunks[1]);
            }
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
