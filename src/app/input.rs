//! Command-line editing: cursor movement, insertion, deletion, history.
//!
//! `cursor` counts characters, not bytes, so multi-byte names and
//! personalities can be typed and edited in place.

use ratatui::text::Span;

use super::App;

impl App {
    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    pub(crate) fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Terminal columns occupied by the text before the cursor.
    pub(crate) fn cursor_column(&self) -> usize {
        let offset = self.byte_offset(self.cursor);
        Span::raw(&self.input[..offset]).width()
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.insert(offset, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub(crate) fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.input.remove(offset);
    }

    /// Delete the character under the cursor.
    pub(crate) fn delete(&mut self) {
        if self.cursor >= self.input_len() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.remove(offset);
    }

    pub(crate) fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input_len());
    }

    pub(crate) fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn move_cursor_end(&mut self) {
        self.cursor = self.input_len();
    }

    /// Remember a submitted line, skipping immediate repeats.
    pub(crate) fn push_history(&mut self, line: &str) {
        if self.input_history.last().map(String::as_str) != Some(line) {
            self.input_history.push(line.to_string());
        }
        self.history_index = None;
        self.history_stash.clear();
    }

    /// Step back through submitted lines (Up arrow).
    pub(crate) fn history_prev(&mut self) {
        if self.input_history.is_empty() {
            return;
        }
        let index = match self.history_index {
            None => {
                self.history_stash = std::mem::take(&mut self.input);
                self.input_history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.history_index = Some(index);
        self.input = self.input_history[index].clone();
        self.cursor = self.input_len();
    }

    /// Step forward (Down arrow); past the newest entry the stashed line returns.
    pub(crate) fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.input_history.len() {
            self.history_index = Some(index + 1);
            self.input = self.input_history[index + 1].clone();
        } else {
            self.history_index = None;
            self.input = std::mem::take(&mut self.history_stash);
        }
        self.cursor = self.input_len();
    }
}

#[cfg(test)]
mod tests {
    use crate::app::tests::test_app;

    #[test]
    fn editing_handles_multibyte_characters() {
        let mut app = test_app();
        for ch in "Zoë".chars() {
            app.insert_char(ch);
        }
        app.move_cursor_left();
        app.backspace();
        assert_eq!(app.input, "Zë");
        app.move_cursor_home();
        app.delete();
        assert_eq!(app.input, "ë");
        app.move_cursor_end();
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut app = test_app();
        for ch in "/name 日本a".chars() {
            app.insert_char(ch);
        }
        assert_eq!(app.cursor, 9);
        assert_eq!(app.cursor_column(), 11);
        app.move_cursor_left();
        assert_eq!(app.cursor_column(), 10);
        app.move_cursor_home();
        assert_eq!(app.cursor_column(), 0);
    }

    #[test]
    fn history_walks_back_and_restores_draft() {
        let mut app = test_app();
        app.push_history("/edit");
        app.push_history("/suggest");
        app.push_history("/suggest");
        app.input = "/na".to_string();

        app.history_prev();
        assert_eq!(app.input, "/suggest");
        app.history_prev();
        assert_eq!(app.input, "/edit");
        app.history_prev();
        assert_eq!(app.input, "/edit");

        app.history_next();
        app.history_next();
        assert_eq!(app.input, "/na");
        assert_eq!(app.cursor, 3);
    }
}
