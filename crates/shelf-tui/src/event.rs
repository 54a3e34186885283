//! Semantic application events: crossterm input mapped to a picker
//! vocabulary so widgets never touch crossterm directly.
//!
//! # Keybindings
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q` (closed), `Ctrl+c`  | `Quit`                     |
//! | `?` (closed)            | `Help` (configurable)      |
//! | `Ctrl+x`                | `Clear` (configurable)     |
//! | `↑` / `k` (closed)      | `Up`                       |
//! | `↓` / `j` (closed)      | `Down`                     |
//! | `←` / `→`               | `Left` / `Right`           |
//! | `Home` / `End`          | `Home` / `End`             |
//! | printable char          | `Char(c)`                  |
//! | `Backspace` / `Delete`  | `Backspace` / `Delete`     |
//! | `Enter`                 | `Enter`                    |
//! | `Esc`                   | `Escape`                   |
//! | bracketed paste         | `Paste(text)`              |
//! | left click              | `Click { column, row }`    |
//! | mouse move              | `Hover { column, row }`    |
//! | wheel                   | `Up` / `Down`              |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! ## Insert mode
//!
//! While the dropdown is open the event loop calls [`to_app_event_insert`]:
//! every printable character (including `q`, `?`, `j`, `k`) is forwarded as
//! `Char`. Only `Ctrl+c`, control-modified bindings, arrows and the editing
//! keys keep their special meaning.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use shelf_core::config::KeybindingsConfig;

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Toggle the help popup.
    Help,
    /// Clear the current selection.
    Clear,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Char(char),
    Backspace,
    Delete,
    Enter,
    Escape,
    /// Bracketed paste (or a barcode scanner posing as a keyboard).
    Paste(String),
    Click { column: u16, row: u16 },
    Hover { column: u16, row: u16 },
    Resize(u16, u16),
}

// ---------------------------------------------------------------------------
// Configurable bindings
// ---------------------------------------------------------------------------

/// One key chord parsed from the `[keybindings]` config section, e.g.
/// `"ctrl+x"`, `"?"`, `"alt+c"`, `"f2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn parse_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("empty key binding");
        }
        let mut parts: Vec<&str> = s.split('+').collect();
        // A literal `+` key shows up as a trailing empty part.
        let key = match parts.pop() {
            Some("") if parts.last() == Some(&"") => {
                parts.pop();
                "+"
            }
            Some(key) => key,
            None => anyhow::bail!("empty key binding"),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => anyhow::bail!("unknown modifier {other:?} in key binding {s:?}"),
            };
        }

        let code = match key.to_ascii_lowercase().as_str() {
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
                Ok(n) => KeyCode::F(n),
                Err(_) => anyhow::bail!("unknown key {key:?} in key binding {s:?}"),
            },
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if modifiers.contains(KeyModifiers::CONTROL) => {
                        KeyCode::Char(c.to_ascii_lowercase())
                    }
                    (Some(c), None) => KeyCode::Char(c),
                    _ => anyhow::bail!("unknown key {key:?} in key binding {s:?}"),
                }
            }
        };
        Ok(Self { code, modifiers })
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        // Terminals disagree on whether shifted characters carry SHIFT.
        let ignore = if matches!(self.code, KeyCode::Char(_)) {
            KeyModifiers::SHIFT
        } else {
            KeyModifiers::NONE
        };
        key.modifiers.difference(ignore) == self.modifiers.difference(ignore)
    }

    /// Chords without Ctrl/Alt type text, so insert mode must not steal them.
    fn is_textual(&self) -> bool {
        matches!(self.code, KeyCode::Char(_))
            && !self
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    }
}

impl std::fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Esc => f.write_str("Esc"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Delete => f.write_str("Delete"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub clear: KeyBinding,
    pub help: KeyBinding,
}

impl Keymap {
    pub fn from_config(cfg: &KeybindingsConfig) -> anyhow::Result<Self> {
        Ok(Self {
            clear: KeyBinding::parse_str(&cfg.clear)?,
            help: KeyBinding::parse_str(&cfg.help)?,
        })
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            clear: KeyBinding {
                code: KeyCode::Char('x'),
                modifiers: KeyModifiers::CONTROL,
            },
            help: KeyBinding {
                code: KeyCode::Char('?'),
                modifiers: KeyModifiers::NONE,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Map a raw crossterm [`Event`] while the dropdown is closed.
///
/// Returns `None` for events with no meaning to the picker (key releases,
/// unbound keys, right clicks).
pub fn to_app_event(event: Event, keymap: &Keymap) -> Option<AppEvent> {
    match event {
        Event::Key(key) => map_key(key, keymap),
        other => map_common(other),
    }
}

/// Map a raw crossterm [`Event`] while the dropdown (and its search input) is
/// open.
pub fn to_app_event_insert(event: Event, keymap: &Keymap) -> Option<AppEvent> {
    match event {
        Event::Key(key) => map_key_insert(key, keymap),
        other => map_common(other),
    }
}

fn map_common(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Paste(text) => Some(AppEvent::Paste(text)),
        Event::Mouse(mouse) => map_mouse(mouse),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<AppEvent> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(AppEvent::Click { column, row }),
        MouseEventKind::Moved => Some(AppEvent::Hover { column, row }),
        MouseEventKind::ScrollUp => Some(AppEvent::Up),
        MouseEventKind::ScrollDown => Some(AppEvent::Down),
        _ => None,
    }
}

fn map_key(key: KeyEvent, keymap: &Keymap) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    if keymap.clear.matches(&key) {
        return Some(AppEvent::Clear);
    }
    if keymap.help.matches(&key) {
        return Some(AppEvent::Help);
    }

    match key.code {
        Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Up | Char('k') if key.modifiers == Mod::NONE => Some(AppEvent::Up),
        Down | Char('j') if key.modifiers == Mod::NONE => Some(AppEvent::Down),

        // Space opens the trigger; other characters are handed over as-is and
        // the app decides (typing on a closed trigger opens it).
        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

fn map_key_insert(key: KeyEvent, keymap: &Keymap) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    if let Char('c') = key.code {
        if key.modifiers == Mod::CONTROL {
            return Some(AppEvent::Quit);
        }
    }
    if !keymap.clear.is_textual() && keymap.clear.matches(&key) {
        return Some(AppEvent::Clear);
    }
    if !keymap.help.is_textual() && keymap.help.matches(&key) {
        return Some(AppEvent::Help);
    }

    match key.code {
        Up => Some(AppEvent::Up),
        Down => Some(AppEvent::Down),
        Left => Some(AppEvent::Left),
        Right => Some(AppEvent::Right),
        Home => Some(AppEvent::Home),
        End => Some(AppEvent::End),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace => Some(AppEvent::Backspace),
        Delete => Some(AppEvent::Delete),
        Enter => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
