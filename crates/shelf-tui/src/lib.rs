//! shelf TUI: a terminal picker around one [`shelf_core::Selector`].
//!
//! The picker is a thin shell: it maps terminal input onto selector
//! operations and draws [`shelf_core::view::SelectorView`] snapshots. All
//! search, caching and dropdown behaviour lives in `shelf-core`.

pub mod app;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use shelf_core::{cache::CachedSelection, config::Config, SearchSource, Selector};

/// Run the picker until the user quits and return the final selection.
///
/// Must be called from within a `tokio` runtime context when the selector
/// searches remotely.
pub fn run<S: SearchSource>(selector: Selector<S>, config: &Config) -> anyhow::Result<CachedSelection> {
    App::new(selector, config)?.run()
}
