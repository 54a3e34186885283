//! Result list widget: the scrollable body of the open dropdown.
//!
//! # Scroll semantics
//!
//! `offset` = index of the first visible row. It is adjusted at render time
//! so the highlighted row is always on screen; the last rendered area is
//! kept so mouse positions can be mapped back to row indices.

use std::cell::Cell;

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};
use shelf_core::view::{ItemView, StatusLine};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ResultListState {
    offset: Cell<usize>,
    /// Rows area (inside borders, above the status line) from the last render.
    rows_area: Cell<Rect>,
}

impl ResultListState {
    /// Forget the scroll position (new result list).
    pub fn reset(&self) {
        self.offset.set(0);
    }

    /// Index of the item drawn at terminal cell (`column`, `row`), using the
    /// last rendered layout.
    pub fn item_at(&self, column: u16, row: u16, len: usize) -> Option<usize> {
        let area = self.rows_area.get();
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return None;
        }
        let index = self.offset.get() + (row - area.y) as usize;
        (index < len).then_some(index)
    }

    /// Move `offset` so `highlight` is inside a window of `height` rows.
    fn scroll_to(&self, highlight: Option<usize>, len: usize, height: usize) {
        let mut offset = self.offset.get().min(len.saturating_sub(height));
        if let Some(h) = highlight {
            if h < offset {
                offset = h;
            } else if h >= offset + height {
                offset = h + 1 - height;
            }
        }
        self.offset.set(offset);
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ResultList<'a> {
    items: &'a [ItemView],
    status: Option<&'a StatusLine>,
    query: &'a str,
    state: &'a ResultListState,
    theme: &'a Theme,
}

impl<'a> ResultList<'a> {
    pub fn new(
        items: &'a [ItemView],
        status: Option<&'a StatusLine>,
        query: &'a str,
        state: &'a ResultListState,
        theme: &'a Theme,
    ) -> Self {
        Self {
            items,
            status,
            query,
            state,
            theme,
        }
    }
}

impl Widget for ResultList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().border_style(self.theme.border_unfocused);
        let inner = block.inner(area);
        block.render(area, buf);

        // Status line takes the bottom row when present.
        let (rows_area, status_area) = match self.status {
            Some(_) if inner.height > 0 => (
                Rect {
                    height: inner.height - 1,
                    ..inner
                },
                Some(Rect {
                    y: inner.bottom() - 1,
                    height: 1,
                    ..inner
                }),
            ),
            _ => (inner, None),
        };
        let rows_area = Rect {
            width: rows_area.width.saturating_sub(1),
            ..rows_area
        };
        self.state.rows_area.set(rows_area);

        let height = (rows_area.height as usize).max(1);
        let total = self.items.len();
        let highlight = self.items.iter().position(|i| i.highlighted);
        self.state.scroll_to(highlight, total, height);
        let start = self.state.offset.get();
        let end = (start + height).min(total);

        let lines: Vec<Line<'static>> = self.items[start..end]
            .iter()
            .map(|item| render_item(item, self.query, rows_area.width as usize, self.theme))
            .collect();
        Paragraph::new(lines).render(rows_area, buf);

        if total > height {
            let sb_area = Rect {
                x: inner.right().saturating_sub(1),
                width: 1,
                ..rows_area
            };
            let mut sb_state = ScrollbarState::new(total)
                .position(start)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }

        if let (Some(status), Some(status_area)) = (self.status, status_area) {
            let style = match status {
                StatusLine::Loading => self.theme.status_loading,
                StatusLine::TooShort { .. } => self.theme.status_hint,
                StatusLine::Empty { .. } => self.theme.status_empty,
                StatusLine::Failed { .. } => self.theme.status_error,
            };
            Paragraph::new(Line::from(Span::styled(format!(" {status}"), style)))
                .render(status_area, buf);
        }
    }
}

// ---------------------------------------------------------------------------
// Item rendering
// ---------------------------------------------------------------------------

fn render_item(item: &ItemView, query: &str, width: usize, theme: &Theme) -> Line<'static> {
    let base = if item.selected {
        theme.list_selected
    } else {
        Style::default()
    };

    let mut left: Vec<Span<'static>> = Vec::new();
    left.push(Span::styled(
        if item.selected { " ✓ " } else { "   " }.to_string(),
        base,
    ));
    left.extend(highlight_match(&item.primary, query, base, theme.search_match));
    if let Some(secondary) = &item.secondary {
        left.push(Span::styled(format!("  {secondary}"), theme.list_secondary));
    }

    let mut right: Vec<Span<'static>> = Vec::new();
    if let Some(stock) = &item.stock {
        right.push(Span::styled(format!("stock {stock}  "), theme.list_stock));
    }
    if let Some(discount) = &item.discount {
        right.push(Span::styled(format!("-{discount}  "), theme.list_secondary));
    }
    if let Some(price) = &item.price {
        right.push(Span::styled(format!("{price} "), theme.list_price));
    }

    let used: usize = left
        .iter()
        .chain(right.iter())
        .map(|s| s.content.chars().count())
        .sum();
    let mut spans = left;
    if !right.is_empty() {
        spans.push(Span::raw(" ".repeat(width.saturating_sub(used).max(1))));
        spans.extend(right);
    }

    let line = Line::from(spans);
    if item.highlighted {
        line.patch_style(theme.list_highlight)
    } else {
        line
    }
}

/// Split `text` into spans with the first case-insensitive occurrence of
/// `query` styled as a match.
fn highlight_match(text: &str, query: &str, base: Style, matched: Style) -> Vec<Span<'static>> {
    let needle = query.trim().to_lowercase();
    let lower = text.to_lowercase();
    // Byte offsets only line up when lowercasing kept every char's width.
    let found = (!needle.is_empty() && lower.len() == text.len())
        .then(|| lower.find(&needle))
        .flatten()
        .filter(|start| text.is_char_boundary(*start) && text.is_char_boundary(start + needle.len()));

    match found {
        Some(start) => {
            let end = start + needle.len();
            let mut spans = Vec::with_capacity(3);
            if start > 0 {
                spans.push(Span::styled(text[..start].to_string(), base));
            }
            spans.push(Span::styled(text[start..end].to_string(), base.patch(matched)));
            if end < text.len() {
                spans.push(Span::styled(text[end..].to_string(), base));
            }
            spans
        }
        None => vec![Span::styled(text.to_string(), base)],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
