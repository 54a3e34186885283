//! The searchable selector: one long-lived control instance.
//!
//! A [`Selector`] owns everything a single select field needs: the query,
//! the current result list, the [`SelectionCache`], the [`Dropdown`]
//! controller and, in remote mode, a [`FetchCoordinator`]. Nothing is shared
//! between instances.
//!
//! The host event loop drives it:
//!
//! ```text
//! keystroke ─► set_query ─► local: filter now
//!                        └► remote: coordinator.submit ─► (debounce) ─► fetch
//! tick      ─► poll ───────────────────────────────────────────────────► apply
//! Enter     ─► handle_key ─► commit ─► cache.store ─► close ─► on_change
//! ```

use std::sync::Arc;

use crate::cache::SelectionCache;
use crate::config::SearchConfig;
use crate::coordinator::{FetchCoordinator, FetchOutcome, FetchSettings, SearchSource, Submission};
use crate::dropdown::{CloseReason, Dropdown, OpenEffect, Step};
use crate::error::{SearchError, SelectorError};
use crate::search::{choose_mode, filter_local, ModeKind, SearchMode};
use crate::types::{Entity, EntityId, EntityKind, Scope};

// ---------------------------------------------------------------------------
// Events / status
// ---------------------------------------------------------------------------

/// Reported to the `on_change` callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Selected(Entity),
    /// The selection was cleared; `id` is always empty.
    Cleared { id: EntityId },
}

impl SelectionEvent {
    pub fn id(&self) -> &EntityId {
        match self {
            SelectionEvent::Selected(e) => &e.id,
            SelectionEvent::Cleared { id } => id,
        }
    }
}

pub type ChangeCallback = Box<dyn FnMut(&SelectionEvent) + Send>;

/// Where the current result list came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchStatus {
    #[default]
    Idle,
    /// Remote query shorter than the minimum; nothing fetched.
    TooShort,
    /// A remote request is scheduled or in flight.
    Loading,
    Ready,
    /// The last remote search failed. The list is empty, or the local
    /// fallback when a static list was supplied.
    Failed(SearchError),
}

/// Keyboard input the selector understands. Everything else stays with the
/// host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The selector used the key; the host must not act on it (Enter never
    /// reaches an enclosing form).
    Consumed,
    Ignored,
}

// ---------------------------------------------------------------------------
// No-op source for local-only selectors
// ---------------------------------------------------------------------------

/// Source type for selectors that only ever filter locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl SearchSource for NoRemote {
    async fn search(
        &self,
        _request: crate::coordinator::SearchRequest,
    ) -> Result<Vec<Entity>, SearchError> {
        Err(SearchError::Transport("no remote search configured".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct SelectorBuilder<S> {
    kind: EntityKind,
    candidates: Option<Vec<Entity>>,
    source: Option<Arc<S>>,
    scope: Scope,
    search: SearchConfig,
    clearable: bool,
    disabled: bool,
    value: Option<EntityId>,
    on_change: Option<ChangeCallback>,
}

impl<S: SearchSource> SelectorBuilder<S> {
    /// Static candidate list. Small lists switch the selector to local mode;
    /// large ones are kept as the remote-failure fallback.
    pub fn candidates(mut self, candidates: Vec<Entity>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn source(mut self, source: Arc<S>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Optional fields may be cleared; required ones may not.
    pub fn clearable(mut self, clearable: bool) -> Self {
        self.clearable = clearable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Initial controlled value.
    pub fn value(mut self, id: impl Into<EntityId>) -> Self {
        self.value = Some(id.into());
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&SelectionEvent) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Choose the search mode and mount the control.
    pub fn build(self) -> Result<Selector<S>, SelectorError> {
        let count = self.candidates.as_ref().map(Vec::len);
        let mode = match choose_mode(count, self.search.local_threshold) {
            ModeKind::Local => SearchMode::Local {
                candidates: self.candidates.unwrap_or_default(),
            },
            ModeKind::Remote => {
                let source = self
                    .source
                    .ok_or(SelectorError::MissingSource { kind: self.kind })?;
                let coordinator =
                    FetchCoordinator::new(source, self.kind, FetchSettings::from(&self.search))
                        .with_scope(self.scope.clone());
                SearchMode::Remote {
                    coordinator,
                    fallback: self.candidates.unwrap_or_default(),
                }
            }
        };

        let mut dropdown = Dropdown::new(self.search.open_policy, self.search.focus_delay());
        dropdown.set_disabled(self.disabled);

        let mut selector = Selector {
            kind: self.kind,
            mode,
            scope: self.scope,
            query: String::new(),
            results: Vec::new(),
            status: SearchStatus::Idle,
            cache: SelectionCache::default(),
            dropdown,
            clearable: self.clearable,
            auto_commit_seq: None,
            on_change: self.on_change,
        };
        tracing::debug!(kind = %selector.kind, mode = ?selector.mode.kind(), candidates = ?count, "selector mounted");

        selector.refresh();
        if let Some(id) = self.value {
            selector.set_value(Some(id));
        }
        Ok(selector)
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

pub struct Selector<S> {
    kind: EntityKind,
    mode: SearchMode<S>,
    scope: Scope,
    query: String,
    results: Vec<Entity>,
    status: SearchStatus,
    cache: SelectionCache,
    dropdown: Dropdown,
    clearable: bool,
    /// Sequence number of a pasted remote query whose single result should
    /// be committed as soon as it arrives.
    auto_commit_seq: Option<u64>,
    on_change: Option<ChangeCallback>,
}

impl<S: SearchSource> Selector<S> {
    pub fn builder(kind: EntityKind) -> SelectorBuilder<S> {
        SelectorBuilder {
            kind,
            candidates: None,
            source: None,
            scope: Scope::default(),
            search: SearchConfig::default(),
            clearable: true,
            disabled: false,
            value: None,
            on_change: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Entity] {
        &self.results
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn selection(&self) -> &SelectionCache {
        &self.cache
    }

    pub fn is_open(&self) -> bool {
        self.dropdown.is_open()
    }

    pub fn is_disabled(&self) -> bool {
        self.dropdown.is_disabled()
    }

    pub fn is_clearable(&self) -> bool {
        self.clearable
    }

    pub fn highlight(&self) -> Option<usize> {
        self.dropdown.highlight()
    }

    /// Shortest query that reaches the network; zero in local mode.
    pub fn min_chars(&self) -> usize {
        match &self.mode {
            SearchMode::Remote { coordinator, .. } => coordinator.settings().min_chars,
            SearchMode::Local { .. } => 0,
        }
    }

    /// True while a remote request is scheduled or in flight.
    pub fn is_fetching(&self) -> bool {
        match &self.mode {
            SearchMode::Remote { coordinator, .. } => coordinator.is_pending(),
            SearchMode::Local { .. } => false,
        }
    }

    // ── Dropdown ───────────────────────────────────────────────────────────

    /// Trigger activated. Returns the open side effects, or `None` when the
    /// control is disabled or already open.
    pub fn open(&mut self) -> Option<OpenEffect> {
        let effect = self.dropdown.open()?;
        if effect.reset_query {
            self.query.clear();
        }
        self.auto_commit_seq = None;
        self.refresh();
        Some(effect)
    }

    pub fn close(&mut self) -> bool {
        self.close_because(CloseReason::Explicit)
    }

    pub fn outside_click(&mut self) -> bool {
        self.close_because(CloseReason::OutsideClick)
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        if disabled {
            self.cancel_pending();
        }
        self.dropdown.set_disabled(disabled);
    }

    fn close_because(&mut self, reason: CloseReason) -> bool {
        let closed = self.dropdown.close(reason);
        if closed {
            self.cancel_pending();
        }
        closed
    }

    fn cancel_pending(&mut self) {
        self.auto_commit_seq = None;
        if let SearchMode::Remote { coordinator, .. } = &mut self.mode {
            if coordinator.is_pending() {
                coordinator.cancel();
                if self.status == SearchStatus::Loading {
                    self.status = SearchStatus::Idle;
                }
            }
        }
    }

    // ── Query ──────────────────────────────────────────────────────────────

    /// Replace the query text (every keystroke ends up here).
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.is_disabled() || query == self.query {
            return;
        }
        self.query = query;
        self.auto_commit_seq = None;
        self.refresh();
    }

    /// Paste (or barcode scan). A single match is committed immediately in
    /// local mode, or as soon as the remote results arrive.
    pub fn paste(&mut self, text: &str) {
        if self.is_disabled() {
            return;
        }
        self.query = text.trim().to_string();
        self.auto_commit_seq = None;
        match self.refresh() {
            Some(Submission::Scheduled(seq)) => self.auto_commit_seq = Some(seq),
            None if self.results.len() == 1 => self.commit(0),
            _ => {}
        }
    }

    /// Recompute results for the current query.
    fn refresh(&mut self) -> Option<Submission> {
        self.dropdown.reset_highlight();
        match &mut self.mode {
            SearchMode::Local { candidates } => {
                self.results = filter_local(candidates, &self.query);
                self.scope.retain(&mut self.results);
                self.status = SearchStatus::Ready;
                None
            }
            SearchMode::Remote { coordinator, .. } => {
                let submission = coordinator.submit(&self.query);
                match submission {
                    Submission::TooShort => {
                        self.results.clear();
                        self.status = SearchStatus::TooShort;
                    }
                    Submission::Scheduled(_) => self.status = SearchStatus::Loading,
                    Submission::Closed => self.status = SearchStatus::Idle,
                }
                Some(submission)
            }
        }
    }

    // ── Remote results ─────────────────────────────────────────────────────

    /// Apply every remote outcome that has arrived, without waiting. Call
    /// once per host tick. Returns whether anything changed.
    pub fn poll(&mut self) -> bool {
        let SearchMode::Remote { coordinator, .. } = &mut self.mode else {
            return false;
        };
        let mut latest = None;
        while let Some(outcome) = coordinator.try_recv() {
            latest = Some(outcome);
        }
        match latest {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Wait for the pending remote search and apply it. Returns `false`
    /// immediately when nothing is pending.
    pub async fn settle(&mut self) -> bool {
        let SearchMode::Remote { coordinator, .. } = &mut self.mode else {
            return false;
        };
        if !coordinator.is_pending() {
            return false;
        }
        match coordinator.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        let SearchMode::Remote { fallback, .. } = &self.mode else {
            return;
        };
        self.dropdown.reset_highlight();

        match outcome.result {
            Ok(mut entities) => {
                self.scope.retain(&mut entities);
                tracing::debug!(seq = outcome.seq, query = %outcome.query, count = entities.len(), "search results applied");
                self.results = entities;
                self.status = SearchStatus::Ready;
            }
            Err(err) => {
                tracing::warn!(seq = outcome.seq, query = %outcome.query, error = %err, "search failed");
                self.results = if fallback.is_empty() {
                    Vec::new()
                } else {
                    let mut local = filter_local(fallback, &self.query);
                    self.scope.retain(&mut local);
                    local
                };
                self.status = SearchStatus::Failed(err);
            }
        }

        self.cache.try_resolve(&self.results);

        if self.auto_commit_seq.take() == Some(outcome.seq) && self.results.len() == 1 {
            self.commit(0);
        }
    }

    // ── Keyboard / pointer ─────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if self.is_disabled() {
            return KeyOutcome::Ignored;
        }
        if !self.is_open() {
            return match key {
                Key::Enter | Key::Down => {
                    self.open();
                    KeyOutcome::Consumed
                }
                Key::Up | Key::Escape => KeyOutcome::Ignored,
            };
        }

        match key {
            Key::Up => self.dropdown.step(Step::Up, self.results.len()),
            Key::Down => self.dropdown.step(Step::Down, self.results.len()),
            Key::Escape => {
                self.close_because(CloseReason::Escape);
            }
            Key::Enter => {
                if let Some(index) = self.dropdown.highlight() {
                    self.commit(index);
                } else if let Some(seq) = self.loading_seq() {
                    // The rows on screen belong to an older query
                    self.auto_commit_seq = Some(seq);
                } else if self.results.len() == 1 {
                    self.commit(0);
                }
            }
        }
        KeyOutcome::Consumed
    }

    /// Pointer hover over a row.
    pub fn hover(&mut self, index: usize) {
        self.dropdown.set_highlight(Some(index), self.results.len());
    }

    /// Pick the row at `index` of the current results.
    pub fn select_index(&mut self, index: usize) -> bool {
        if self.is_disabled() || index >= self.results.len() {
            return false;
        }
        self.commit(index);
        true
    }

    /// Sequence number of the remote search the current query is waiting on.
    fn loading_seq(&self) -> Option<u64> {
        match &self.mode {
            SearchMode::Remote { coordinator, .. }
                if self.status == SearchStatus::Loading && coordinator.is_pending() =>
            {
                Some(coordinator.latest_seq())
            }
            _ => None,
        }
    }

    fn commit(&mut self, index: usize) {
        let entity = self.results[index].clone();
        tracing::debug!(id = %entity.id, name = %entity.name, "selection committed");
        self.cache.store(entity.clone());
        self.query.clear();
        self.close_because(CloseReason::Selection);
        self.emit(SelectionEvent::Selected(entity));
    }

    // ── Value ──────────────────────────────────────────────────────────────

    /// Explicit clear. No-op on required fields.
    pub fn clear(&mut self) -> bool {
        if !self.clearable {
            return false;
        }
        self.cache.evict();
        if !self.query.is_empty() {
            self.query.clear();
            if self.is_open() {
                self.refresh();
            }
        }
        self.emit(SelectionEvent::Cleared {
            id: EntityId::empty(),
        });
        true
    }

    /// A parent changed the controlled value.
    pub fn set_value(&mut self, id: Option<EntityId>) -> bool {
        self.cache
            .sync_external(id.as_ref(), self.mode.statics(), &self.results)
    }

    /// Tear down. Pending timers are cancelled and nothing is fetched again.
    pub fn unmount(&mut self) {
        self.dropdown.close(CloseReason::Teardown);
        self.auto_commit_seq = None;
        if let SearchMode::Remote { coordinator, .. } = &mut self.mode {
            coordinator.shutdown();
        }
        tracing::debug!(kind = %self.kind, "selector unmounted");
    }

    fn emit(&mut self, event: SelectionEvent) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(&event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
