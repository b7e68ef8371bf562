//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure used to create tasks in
//! the TUI: field ordering, text entry, the area pickers and conversion of
//! the entered values into a `NewTask`. Business rules are checked by the
//! store, not here; the form only rejects dates it cannot read.

use chrono::NaiveDate;

use crate::fields::{Area, Priority};
use crate::format::parse_date_input;
use crate::task::{NewActivity, NewTask};
use crate::tui::input::InputField;

/// Global order constants for the form fields.
pub const NAME_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const START_GLOBAL_ORDER: usize = 2;
pub const END_GLOBAL_ORDER: usize = 3;
pub const PRIORITY_GLOBAL_ORDER: usize = 4;
pub const AREAS_GLOBAL_ORDER: usize = 5;
pub const SUPPORT_GLOBAL_ORDER: usize = 6;
pub const ACTIVITIES_GLOBAL_ORDER: usize = 7;

const FIELD_COUNT: usize = 8;

/// A set of areas picked with a moving cursor.
#[derive(Clone, Debug, Default)]
pub struct AreaPicker {
    pub selected: [bool; 8],
    pub cursor: usize,
}

impl AreaPicker {
    pub fn toggle(&mut self) {
        self.selected[self.cursor] = !self.selected[self.cursor];
    }

    pub fn move_cursor(&mut self, right: bool) {
        let n = Area::ALL.len();
        self.cursor = if right { (self.cursor + 1) % n } else { (self.cursor + n - 1) % n };
    }

    pub fn areas(&self) -> Vec<Area> {
        Area::ALL
            .iter()
            .zip(self.selected.iter())
            .filter(|(_, &on)| on)
            .map(|(&a, _)| a)
            .collect()
    }
}

/// Task form for new tasks.
pub struct TaskForm {
    pub name: InputField,
    pub description: InputField,
    pub start: InputField,
    pub end: InputField,
    /// Comma-separated activity names.
    pub activities: InputField,
    pub priority: usize,
    pub areas: AreaPicker,
    pub support: AreaPicker,
    pub current_field: usize,
}

impl TaskForm {
    /// Empty form starting today and ending a week later.
    pub fn new(today: NaiveDate) -> Self {
        let mut form = Self {
            name: InputField::new(),
            description: InputField::new(),
            start: InputField::with_value(&today.to_string()),
            end: InputField::with_value("in 7d"),
            activities: InputField::new(),
            priority: 1, // Medium
            areas: AreaPicker::default(),
            support: AreaPicker::default(),
            current_field: 0,
        };
        form.update_active_field();
        form
    }

    /// Pre-select the owning area, as an area user creating work for itself.
    pub fn with_owner(mut self, area: Area) -> Self {
        if let Some(i) = Area::ALL.iter().position(|&a| a == area) {
            self.areas.selected[i] = true;
        }
        self
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    fn text_field_mut(&mut self, idx: usize) -> Option<&mut InputField> {
        match idx {
            NAME_GLOBAL_ORDER => Some(&mut self.name),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            START_GLOBAL_ORDER => Some(&mut self.start),
            END_GLOBAL_ORDER => Some(&mut self.end),
            ACTIVITIES_GLOBAL_ORDER => Some(&mut self.activities),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        let current = self.current_field;
        for idx in 0..FIELD_COUNT {
            if let Some(field) = self.text_field_mut(idx) {
                field.active = idx == current;
            }
        }
    }

    /// Handle character input. Space toggles the area under the cursor in
    /// the area pickers.
    pub fn handle_char(&mut self, c: char) {
        match self.current_field {
            AREAS_GLOBAL_ORDER if c == ' ' => self.areas.toggle(),
            SUPPORT_GLOBAL_ORDER if c == ' ' => self.support.toggle(),
            idx => {
                if let Some(field) = self.text_field_mut(idx) {
                    field.handle_char(c);
                }
            }
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.text_field_mut(self.current_field) {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.text_field_mut(self.current_field) {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PRIORITY_GLOBAL_ORDER => {
                let n = Priority::ALL.len();
                self.priority = if right { (self.priority + 1) % n } else { (self.priority + n - 1) % n };
            }
            AREAS_GLOBAL_ORDER => self.areas.move_cursor(right),
            SUPPORT_GLOBAL_ORDER => self.support.move_cursor(right),
            idx => {
                if let Some(field) = self.text_field_mut(idx) {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }

    /// Build the task to hand to the store. Fails only on unreadable dates.
    pub fn to_new_task(&self, today: NaiveDate) -> Result<NewTask, String> {
        let start_date = parse_date_input(&self.start.value, today)
            .ok_or_else(|| format!("Invalid start date '{}'", self.start.value))?;
        let end_date = parse_date_input(&self.end.value, today)
            .ok_or_else(|| format!("Invalid end date '{}'", self.end.value))?;

        let support_areas = self.support.areas();
        Ok(NewTask {
            name: self.name.value.trim().to_string(),
            description: self.description.value.trim().to_string(),
            areas: self.areas.areas(),
            requires_support: !support_areas.is_empty(),
            support_areas,
            start_date,
            end_date,
            priority: self.selected_priority(),
            activities: self
                .activities
                .value
                .split(',')
                .map(|s| NewActivity::named(s.trim()))
                .collect(),
            documents: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn type_str(form: &mut TaskForm, s: &str) {
        for c in s.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_form_builds_new_task() {
        let today = d("2024-05-10");
        let mut form = TaskForm::new(today).with_owner(Area::Legal);
        type_str(&mut form, "Contract review");
        form.current_field = PRIORITY_GLOBAL_ORDER;
        form.handle_left_right(false); // Medium -> High
        form.current_field = SUPPORT_GLOBAL_ORDER;
        form.handle_left_right(true);
        form.handle_char(' '); // Comunidades
        form.current_field = ACTIVITIES_GLOBAL_ORDER;
        type_str(&mut form, "read, , sign");

        let nt = form.to_new_task(today).unwrap();
        assert_eq!(nt.name, "Contract review");
        assert_eq!(nt.areas, vec![Area::Legal]);
        assert_eq!(nt.priority, Priority::High);
        assert!(nt.requires_support);
        assert_eq!(nt.support_areas, vec![Area::Comunidades]);
        assert_eq!(nt.start_date, today);
        assert_eq!(nt.end_date, d("2024-05-17"));
        let names: Vec<&str> = nt.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["read", "", "sign"]);
    }

    #[test]
    fn test_form_rejects_unreadable_date() {
        let today = d("2024-05-10");
        let mut form = TaskForm::new(today);
        form.current_field = END_GLOBAL_ORDER;
        type_str(&mut form, "xx");
        assert!(form.to_new_task(today).unwrap_err().contains("end date"));
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = TaskForm::new(d("2024-05-10"));
        form.prev_field();
        assert_eq!(form.current_field, ACTIVITIES_GLOBAL_ORDER);
        assert!(form.activities.active);
        assert!(!form.name.active);
        form.next_field();
        assert_eq!(form.current_field, NAME_GLOBAL_ORDER);
        assert!(form.name.active);
    }
}
