//! Single-line input field state: text plus a byte-offset cursor.
//!
//! Editing keeps the cursor on a UTF-8 char boundary at all times; every
//! mutation goes through the boundary-safe helpers below.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default)]
pub(crate) struct FieldState {
    text: String,
    /// Byte offset into `text`; always on a char boundary.
    cursor: usize,
}

impl FieldState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn cursor_at_start(&self) -> bool {
        self.cursor == 0
    }

    /// Display column of the cursor within the field text.
    pub(crate) fn cursor_col(&self) -> u16 {
        UnicodeWidthStr::width(&self.text[..self.cursor]) as u16
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .chars()
            .next_back()
            .map(|ch| self.cursor - ch.len_utf8())
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
            .unwrap_or(self.text.len())
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.prev_boundary();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    fn delete_forward(&mut self) -> bool {
        if self.cursor == self.text.len() {
            return false;
        }
        let end = self.next_boundary();
        self.text.replace_range(self.cursor..end, "");
        true
    }

    /// Apply one editing key. Returns whether anything changed (and therefore
    /// whether the caller should redraw). Keys the field does not understand
    /// are reported unchanged.
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(ch);
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor = self.prev_boundary();
                true
            }
            KeyCode::Right => {
                if self.cursor == self.text.len() {
                    return false;
                }
                self.cursor = self.next_boundary();
                true
            }
            KeyCode::Home => {
                let moved = self.cursor != 0;
                self.cursor = 0;
                moved
            }
            KeyCode::End => {
                let moved = self.cursor != self.text.len();
                self.cursor = self.text.len();
                moved
            }
            _ => false,
        }
    }
}
