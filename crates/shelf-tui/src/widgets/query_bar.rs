//! Query bar widget: the search input at the top of the open dropdown.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor.
//! - `Backspace` / `Delete` remove the character before / under the cursor.
//! - `Left` / `Right` / `Home` / `End` move the cursor.

use crate::event::AppEvent;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct QueryInputState {
    /// Text as typed, not normalised.
    pub text: String,
    /// Byte offset of the cursor within `text`.
    pub cursor: usize,
}

impl QueryInputState {
    /// Apply an editing event. Returns whether the text changed; cursor-only
    /// moves return `false`.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                tracing::debug!(query = %self.text, cursor = self.cursor, "query: char inserted");
                true
            }
            AppEvent::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let prev = self.prev_boundary();
                self.text.remove(prev);
                self.cursor = prev;
                tracing::debug!(query = %self.text, cursor = self.cursor, "query: backspace");
                true
            }
            AppEvent::Delete => {
                if self.cursor >= self.text.len() {
                    return false;
                }
                self.text.remove(self.cursor);
                tracing::debug!(query = %self.text, cursor = self.cursor, "query: delete");
                true
            }
            AppEvent::Left => {
                self.cursor = self.prev_boundary();
                false
            }
            AppEvent::Right => {
                self.cursor = self.next_boundary();
                false
            }
            AppEvent::Home => {
                self.cursor = 0;
                false
            }
            AppEvent::End => {
                self.cursor = self.text.len();
                false
            }
            _ => false,
        }
    }

    /// Insert a whole string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Adopt text the selector changed on its own (reset on open, cleared on
    /// commit, trimmed paste). The cursor moves to the end.
    pub fn sync(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.cursor = self.text.len();
        }
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.text.len())
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct QueryBar<'a> {
    state: &'a QueryInputState,
    /// Dim placeholder, e.g. "Search products…".
    placeholder: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> QueryBar<'a> {
    pub fn new(
        state: &'a QueryInputState,
        placeholder: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            placeholder,
            focused,
            theme,
        }
    }

    /// Absolute terminal position of the text cursor within this widget's
    /// rendered area. Pass to `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // The block adds 1-cell borders; text starts at (area.x+1, area.y+1).
        let col = self.state.text[..self.state.cursor].chars().count() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(2));
        let y = area.y + 1;
        (x, y)
    }
}

impl Widget for QueryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered().title(" Search ").border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.state.text.is_empty() {
            Line::from(Span::styled(
                self.placeholder.to_string(),
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else {
            Line::from(self.state.text.as_str())
        };
        Paragraph::new(line).render(inner, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
