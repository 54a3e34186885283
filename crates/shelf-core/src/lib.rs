//! shelf-core: the headless searchable selector.
//!
//! This crate owns every piece of selector behaviour; front ends only feed it
//! input and draw its [`view::SelectorView`].
//!
//! # Architecture
//!
//! ```text
//!            ┌── Local ──► search::filter_local ──┐
//! query ──► mode                                  ├──► results ──► view
//!            └── Remote ─► coordinator ─► source ─┘       │
//!                                                         ▼
//!                        dropdown (open/closed, highlight) ──► cache
//! ```
//!
//! Remote searches run on background `tokio` tasks and report back over a
//! channel; the owning event loop applies them with [`Selector::poll`].

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod dropdown;
pub mod error;
pub mod format;
pub mod search;
pub mod selector;
pub mod types;
pub mod view;

pub use coordinator::{SearchRequest, SearchSource};
pub use error::{SearchError, SelectorError};
pub use selector::{Key, KeyOutcome, NoRemote, SearchStatus, SelectionEvent, Selector};
pub use types::{Entity, EntityId, EntityKind, Scope};
