//! Configuration types for shelf.
//!
//! [`Config::load`] reads `~/.config/shelf/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_with`] layers
//! an extra file (the `--config` flag) on top. [`Config::defaults`] returns
//! the defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
local_threshold = 20
min_chars       = 2
debounce_ms     = 300
timeout_ms      = 10000
focus_delay_ms  = 50
open_policy     = "reset"

[remote]
base_url = "http://127.0.0.1:8080"

[ui]
theme      = "default"
currency   = "₽"
show_stock = true

[keybindings]
clear = "ctrl+x"
help  = "?"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/shelf/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// What happens to the typed query when the dropdown opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    /// Start every session with an empty query.
    #[default]
    Reset,
    /// Keep whatever was typed last time (incremental search).
    Preserve,
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Static lists up to this size are filtered locally.
    #[serde(default = "default_local_threshold")]
    pub local_threshold: usize,
    /// Shortest normalised query that reaches the network.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_focus_delay_ms")]
    pub focus_delay_ms: u64,
    #[serde(default)]
    pub open_policy: OpenPolicy,
}

fn default_local_threshold() -> usize { 20 }
fn default_min_chars() -> usize { 2 }
fn default_debounce_ms() -> u64 { 300 }
fn default_timeout_ms() -> u64 { 10_000 }
fn default_focus_delay_ms() -> u64 { 50 }

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            local_threshold: default_local_threshold(),
            min_chars: default_min_chars(),
            debounce_ms: default_debounce_ms(),
            timeout_ms: default_timeout_ms(),
            focus_delay_ms: default_focus_delay_ms(),
            open_policy: OpenPolicy::default(),
        }
    }
}

/// `[remote]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>`.
    #[serde(default)]
    pub token: Option<String>,
    /// Sent verbatim as the `Cookie` header (session id, CSRF cookie).
    #[serde(default)]
    pub cookie: Option<String>,
}

fn default_base_url() -> String { "http://127.0.0.1:8080".to_string() }

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            cookie: None,
        }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_show_stock")]
    pub show_stock: bool,
}

fn default_theme() -> String { "default".to_string() }
fn default_currency() -> String { "₽".to_string() }
fn default_show_stock() -> bool { true }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            currency: default_currency(),
            show_stock: default_show_stock(),
        }
    }
}

/// `[keybindings]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_clear")]
    pub clear: String,
    #[serde(default = "default_help")]
    pub help: String,
}

fn default_clear() -> String { "ctrl+x".to_string() }
fn default_help() -> String { "?".to_string() }

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            clear: default_clear(),
            help: default_help(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/shelf/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(None)
    }

    /// Like [`Config::load`], with `extra` layered last when given. A missing
    /// `extra` file is an error; a missing user file is not.
    pub fn load_with(extra: Option<&Path>) -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false));
        if let Some(extra) = extra {
            builder = builder.add_source(config::File::from(extra).required(true));
        }

        builder.build()?.try_deserialize().map_err(Into::into)
    }

    /// Load the defaults with a single file layered on top, without touching
    /// the user config directory.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("shelf")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
