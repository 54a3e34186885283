//! Help popup: centred floating overlay listing all keybindings.
//!
//! Toggle with the help key (`?` by default); close with it again or `Escape`.

use crate::event::Keymap;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

pub struct HelpPopup<'a> {
    keymap: &'a Keymap,
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(keymap: &'a Keymap, theme: &'a Theme) -> Self {
        Self { keymap, theme }
    }

    fn bindings(&self) -> Vec<(String, &'static str)> {
        vec![
            ("Enter  /  Space".to_string(), "Open the dropdown"),
            ("type".to_string(), "Search (opens the dropdown)"),
            ("↑ k  /  ↓ j".to_string(), "Move the highlight"),
            ("Enter".to_string(), "Pick the highlighted row"),
            ("Esc".to_string(), "Close the dropdown"),
            ("click outside".to_string(), "Close the dropdown"),
            ("paste".to_string(), "Search; a single match is picked"),
            (self.keymap.clear.to_string(), "Clear the selection"),
            (self.keymap.help.to_string(), "Toggle this help popup"),
            ("q  /  Ctrl+c".to_string(), "Quit and print the selection"),
        ]
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bindings = self.bindings();
        let popup = centered_rect(64, bindings.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(format!(" shelf keybindings ({} to close) ", self.keymap.help))
            .border_style(self.theme.border_focused);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let lines: Vec<Line> = bindings
            .into_iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<18}", key),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(desc),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
