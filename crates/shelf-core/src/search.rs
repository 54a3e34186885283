//! Search layer: local-versus-remote mode choice and the in-memory filter.
//!
//! A selector decides once, at mount, whether it filters a static candidate
//! list on every keystroke or hands the query to a
//! [`FetchCoordinator`](crate::coordinator::FetchCoordinator). The choice is a
//! pure function of the candidate list size.

use crate::coordinator::FetchCoordinator;
use crate::types::{normalize_query, Entity};

/// Which filtering strategy a selector instance uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Local,
    Remote,
}

/// Local when a static list exists and has at most `threshold` entries,
/// remote otherwise.
pub fn choose_mode(candidate_count: Option<usize>, threshold: usize) -> ModeKind {
    match candidate_count {
        Some(n) if n <= threshold => ModeKind::Local,
        _ => ModeKind::Remote,
    }
}

/// Capability of one selector instance, fixed at mount.
pub enum SearchMode<S> {
    Local {
        candidates: Vec<Entity>,
    },
    Remote {
        coordinator: FetchCoordinator<S>,
        /// Static list kept for failure fallback. May be empty.
        fallback: Vec<Entity>,
    },
}

impl<S> SearchMode<S> {
    pub fn kind(&self) -> ModeKind {
        match self {
            SearchMode::Local { .. } => ModeKind::Local,
            SearchMode::Remote { .. } => ModeKind::Remote,
        }
    }

    /// The statically supplied list, whichever mode holds it.
    pub fn statics(&self) -> &[Entity] {
        match self {
            SearchMode::Local { candidates } => candidates,
            SearchMode::Remote { fallback, .. } => fallback,
        }
    }
}

/// True when the already-normalised `needle` occurs in the entity's name,
/// code, secondary identifier or category.
pub fn matches(entity: &Entity, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    std::iter::once(entity.name.as_str())
        .chain(entity.code.as_deref())
        .chain(entity.secondary.as_deref())
        .chain(entity.category.as_deref())
        .any(|field| field.to_lowercase().contains(needle))
}

/// Synchronous substring filter. Order of `candidates` is preserved; an
/// empty query returns everything.
pub fn filter_local(candidates: &[Entity], query: &str) -> Vec<Entity> {
    let needle = normalize_query(query);
    candidates
        .iter()
        .filter(|e| matches(e, &needle))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
