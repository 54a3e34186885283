//! Error types for shelf-core.
//!
//! [`SearchError`] never leaves a mounted selector: the result list is
//! cleared, the error is logged and the control keeps working.
//! [`SelectorError`] is only returned while mounting.

use std::time::Duration;

use crate::types::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Connection refused, reset, DNS failure, malformed URL.
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    #[error("search endpoint returned HTTP {status}")]
    Status { status: u16 },
    /// The body was not JSON, or not an array of entity objects.
    #[error("invalid search response: {0}")]
    Decode(String),
    #[error("search timed out after {0:?}")]
    Timeout(Duration),
}

/// Misconfiguration detected when a selector is mounted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("{kind} selector needs remote search but no search source was configured")]
    MissingSource { kind: EntityKind },
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Decode(err.to_string())
    }
}
