//! Trigger widget: the closed face of the selector.
//!
//! Shows the cached selection (never the transient result list) or the
//! placeholder, an open/closed arrow, and a clear hint on optional fields
//! that hold a value.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use shelf_core::view::TriggerView;

pub struct Trigger<'a> {
    view: &'a TriggerView,
    title: &'a str,
    open: bool,
    focused: bool,
    /// Rendered as `✕ <clear_key>` when the trigger is clearable.
    clear_key: &'a str,
    theme: &'a Theme,
}

impl<'a> Trigger<'a> {
    pub fn new(
        view: &'a TriggerView,
        title: &'a str,
        open: bool,
        focused: bool,
        clear_key: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            view,
            title,
            open,
            focused,
            clear_key,
            theme,
        }
    }

    /// Width of the clear hint including its leading space, or 0.
    pub fn clear_hint_width(&self) -> u16 {
        if self.view.clearable && !self.view.disabled {
            (self.clear_key.chars().count() + 3) as u16
        } else {
            0
        }
    }

    /// Screen area of the clear hint inside `area`, if one is drawn.
    pub fn clear_hint_area(&self, area: Rect) -> Option<Rect> {
        let width = self.clear_hint_width();
        (width > 0).then(|| Rect {
            // inside the right border, left of the arrow
            x: area.right().saturating_sub(width + 3),
            y: area.y + 1,
            width,
            height: 1,
        })
    }
}

impl Widget for Trigger<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused && !self.view.disabled {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let text_style = match (&self.view.label, self.view.disabled) {
            (_, true) => self.theme.trigger_disabled,
            (Some(_), false) => self.theme.trigger_value,
            (None, false) => self.theme.trigger_placeholder,
        };
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", self.view.text()),
            text_style,
        )))
        .render(inner, buf);

        let arrow = if self.open { "▴ " } else { "▾ " };
        let arrow_x = inner.right().saturating_sub(2);
        buf.set_string(arrow_x, inner.y, arrow, border_style);

        if let Some(hint_area) = self.clear_hint_area(area) {
            buf.set_string(
                hint_area.x,
                hint_area.y,
                format!(" ✕ {}", self.clear_key),
                self.theme.trigger_clear_hint,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
