//! Input field handling for the terminal user interface.

/// A text input field with cursor position and active state management.
///
/// The cursor counts characters, not bytes, so accented area and task
/// names edit correctly.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            active: false,
        }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len_chars() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len_chars() {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_multibyte_text() {
        let mut f = InputField::with_value("Revisión");
        assert_eq!(f.cursor, 8);
        f.handle_backspace();
        assert_eq!(f.value, "Revisió");
        f.move_cursor_left();
        f.handle_char('x');
        assert_eq!(f.value, "Revisixó");
        f.handle_delete();
        assert_eq!(f.value, "Revisix");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut f = InputField::new();
        f.move_cursor_left();
        f.handle_backspace();
        f.handle_delete();
        assert_eq!(f.cursor, 0);
        f.handle_char('a');
        f.move_cursor_right();
        assert_eq!(f.cursor, 1);
    }
}
