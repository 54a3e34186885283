//! Test builders: a scripted [`SearchSource`], selector constructors and a
//! recorder for change callbacks.
//!
//! These are designed for readability in test assertions, not for
//! production use. They panic on poisoned locks rather than returning
//! `Result`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shelf_core::config::SearchConfig;
use shelf_core::selector::SelectorBuilder;
use shelf_core::{
    Entity, EntityKind, SearchError, SearchRequest, SearchSource, SelectionEvent, Selector,
};

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    result: Result<Vec<Entity>, SearchError>,
}

/// In-memory [`SearchSource`] answering per normalised query.
///
/// Unscripted queries answer `Ok(vec![])` immediately. Every call is
/// counted and recorded, including calls whose outcome is later discarded.
///
/// # Example
///
/// ```rust
/// let source = ScriptedSource::new()
///     .respond("brake", vec![Entity::new(1u64, "Brake pads")])
///     .respond_after("bolt", Duration::from_millis(500), vec![])
///     .fail("oil", SearchError::Status { status: 502 })
///     .shared();
/// ```
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, query: &str, entities: Vec<Entity>) -> Self {
        self.respond_after(query, Duration::ZERO, entities)
    }

    pub fn respond_after(self, query: &str, delay: Duration, entities: Vec<Entity>) -> Self {
        self.script.lock().unwrap().insert(
            query.to_string(),
            Scripted {
                delay,
                result: Ok(entities),
            },
        );
        self
    }

    pub fn fail(self, query: &str, err: SearchError) -> Self {
        self.script.lock().unwrap().insert(
            query.to_string(),
            Scripted {
                delay: Duration::ZERO,
                result: Err(err),
            },
        );
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of searches that reached the source.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries in the order they reached the source.
    pub fn queries(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.query.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<SearchRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl SearchSource for ScriptedSource {
    async fn search(&self, request: SearchRequest) -> Result<Vec<Entity>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self.script.lock().unwrap().get(&request.query).cloned();
        match scripted {
            Some(Scripted { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Selector constructors
// ---------------------------------------------------------------------------

/// Builder for a selector backed by `source`, with the default search
/// settings (threshold 20, 2 chars, 300 ms debounce).
pub fn remote(kind: EntityKind, source: &Arc<ScriptedSource>) -> SelectorBuilder<ScriptedSource> {
    Selector::<ScriptedSource>::builder(kind)
        .source(Arc::clone(source))
        .search_config(SearchConfig::default())
}

/// A mounted remote selector with no static list, opened and ready to type.
pub fn open_remote(kind: EntityKind, source: &Arc<ScriptedSource>) -> Selector<ScriptedSource> {
    let mut selector = remote(kind, source).build().unwrap();
    selector.open();
    selector
}

// ---------------------------------------------------------------------------
// ChangeLog
// ---------------------------------------------------------------------------

/// Records every [`SelectionEvent`] passed to `on_change`.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    events: Arc<Mutex<Vec<SelectionEvent>>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to hand to [`SelectorBuilder::on_change`].
    pub fn callback(&self) -> impl FnMut(&SelectionEvent) + Send + 'static {
        let events = Arc::clone(&self.events);
        move |event: &SelectionEvent| events.lock().unwrap().push(event.clone())
    }

    pub fn events(&self) -> Vec<SelectionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Ids reported so far; clears show up as empty strings.
    pub fn ids(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.id().as_str().to_string())
            .collect()
    }
}
