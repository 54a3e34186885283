//! shelf-remote: search endpoint adapters for shelf.
//!
//! Each adapter implements [`shelf_core::SearchSource`]: it turns a
//! [`shelf_core::SearchRequest`] into a backend call and maps the response
//! onto normalised [`shelf_core::Entity`] values.

pub mod http;

pub use http::{decode_entities, HttpSource};
