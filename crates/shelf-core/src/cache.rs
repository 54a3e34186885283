//! Selection cache, the single source of truth for what is shown as
//! selected.
//!
//! The result list churns on every keystroke; the cache does not. The trigger
//! label is always read from here, so narrowing a search can never change
//! what the user sees as their current pick.

use crate::types::{Entity, EntityId};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CachedSelection {
    #[default]
    Empty,
    Resolved(Entity),
    /// A parent supplied an id nothing on hand could resolve. Rendered as the
    /// placeholder until a later search or value change resolves it.
    Unresolved(EntityId),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionCache {
    current: CachedSelection,
}

impl SelectionCache {
    pub fn current(&self) -> &CachedSelection {
        &self.current
    }

    pub fn entity(&self) -> Option<&Entity> {
        match &self.current {
            CachedSelection::Resolved(e) => Some(e),
            _ => None,
        }
    }

    /// Id of the selection, resolved or not.
    pub fn id(&self) -> Option<&EntityId> {
        match &self.current {
            CachedSelection::Empty => None,
            CachedSelection::Resolved(e) => Some(&e.id),
            CachedSelection::Unresolved(id) => Some(id),
        }
    }

    /// Label for the trigger; `None` renders the placeholder.
    pub fn label(&self) -> Option<&str> {
        self.entity().map(|e| e.name.as_str())
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.id() == Some(id)
    }

    pub fn store(&mut self, entity: Entity) {
        tracing::debug!(id = %entity.id, name = %entity.name, "selection cached");
        self.current = CachedSelection::Resolved(entity);
    }

    /// Evict the selection. Returns whether anything was cached.
    pub fn evict(&mut self) -> bool {
        let had = !matches!(self.current, CachedSelection::Empty);
        self.current = CachedSelection::Empty;
        had
    }

    /// Apply an externally controlled value.
    ///
    /// A matching id leaves the cache untouched. Otherwise the entity is
    /// looked up in `statics` first, then in `results`; failing both the id
    /// is remembered as unresolved. Returns `true` when the cache changed.
    pub fn sync_external(
        &mut self,
        id: Option<&EntityId>,
        statics: &[Entity],
        results: &[Entity],
    ) -> bool {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return self.evict(),
        };
        if self.entity().is_some_and(|e| &e.id == id) {
            return false;
        }

        match resolve(id, statics, results) {
            Some(entity) => self.store(entity.clone()),
            None => {
                tracing::debug!(id = %id, "external value not resolvable, showing placeholder");
                self.current = CachedSelection::Unresolved(id.clone());
            }
        }
        true
    }

    /// Try to upgrade an unresolved id from a freshly arrived list.
    pub fn try_resolve(&mut self, list: &[Entity]) -> bool {
        let CachedSelection::Unresolved(id) = &self.current else {
            return false;
        };
        match list.iter().find(|e| &e.id == id) {
            Some(entity) => {
                self.store(entity.clone());
                true
            }
            None => false,
        }
    }
}

fn resolve<'a>(id: &EntityId, statics: &'a [Entity], results: &'a [Entity]) -> Option<&'a Entity> {
    statics
        .iter()
        .find(|e| &e.id == id)
        .or_else(|| results.iter().find(|e| &e.id == id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
