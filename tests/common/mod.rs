//! Shared test utilities for shelf integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The scripted source is deterministic under
//! `tokio::time::pause()`; the fake search API needs real time.

pub mod assertions;
pub mod builders;
pub mod fake_search_api;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
