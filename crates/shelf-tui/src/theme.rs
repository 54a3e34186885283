//! Colour theme for the shelf picker.
//!
//! Themes are defined as TOML files. The built-in themes are embedded in the
//! binary via [`include_str!`] so the picker works without any files on disk.
//! `[ui] theme` in the config names a built-in theme or points at a `.toml`
//! file; see [`Theme::resolve`].

use std::path::Path;

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types, mirroring the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        for (on, modifier) in [
            (self.bold, Modifier::BOLD),
            (self.dim, Modifier::DIM),
            (self.italic, Modifier::ITALIC),
            (self.underlined, Modifier::UNDERLINED),
        ] {
            if on {
                style = style.add_modifier(modifier);
            }
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTrigger {
    value: RawStyle,
    placeholder: RawStyle,
    disabled: RawStyle,
    clear_hint: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawList {
    highlight: RawStyle,
    selected: RawStyle,
    secondary: RawStyle,
    price: RawStyle,
    stock: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    loading: RawStyle,
    hint: RawStyle,
    empty: RawStyle,
    error: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    #[serde(rename = "match")]
    matched: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    borders: RawBorders,
    trigger: RawTrigger,
    list: RawList,
    status: RawStatus,
    search: RawSearch,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Picker colour theme. All styles are pre-resolved ratatui [`Style`] values.
#[derive(Debug, Clone)]
pub struct Theme {
    pub border_focused: Style,
    pub border_unfocused: Style,

    /// Trigger text when a value is selected.
    pub trigger_value: Style,
    pub trigger_placeholder: Style,
    pub trigger_disabled: Style,
    /// The `✕ Ctrl+x` affordance on clearable triggers.
    pub trigger_clear_hint: Style,

    pub list_highlight: Style,
    /// Row of the currently selected entity.
    pub list_selected: Style,
    pub list_secondary: Style,
    pub list_price: Style,
    pub list_stock: Style,

    pub status_loading: Style,
    /// "Type at least N characters" hint.
    pub status_hint: Style,
    pub status_empty: Style,
    pub status_error: Style,

    /// Inline highlight applied to the part of a label matching the query.
    pub search_match: Style,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed; the `theme` unit tests keep
    /// it valid.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Load and parse the embedded Gruvbox Dark theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str(GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Resolve the `[ui] theme` setting: `default`, `gruvbox` (or
    /// `gruvbox_dark`), or a path to a theme file ending in `.toml`. Unknown
    /// names fall back to the default theme.
    pub fn resolve(name: &str) -> anyhow::Result<Self> {
        if name.ends_with(".toml") {
            return Self::from_file(Path::new(name));
        }
        Ok(match name.to_ascii_lowercase().as_str() {
            "gruvbox" | "gruvbox_dark" | "gruvbox-dark" => Self::load_gruvbox_dark(),
            "default" => Self::load_default(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using default");
                Self::load_default()
            }
        })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            trigger_value: raw.trigger.value.into_style(),
            trigger_placeholder: raw.trigger.placeholder.into_style(),
            trigger_disabled: raw.trigger.disabled.into_style(),
            trigger_clear_hint: raw.trigger.clear_hint.into_style(),
            list_highlight: raw.list.highlight.into_style(),
            list_selected: raw.list.selected.into_style(),
            list_secondary: raw.list.secondary.into_style(),
            list_price: raw.list.price.into_style(),
            list_stock: raw.list.stock.into_style(),
            status_loading: raw.status.loading.into_style(),
            status_hint: raw.status.hint.into_style(),
            status_empty: raw.status.empty.into_style(),
            status_error: raw.status.error.into_style(),
            search_match: raw.search.matched.into_style(),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
