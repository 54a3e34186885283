//! Debounced remote-fetch coordinator.
//!
//! Every query change calls [`FetchCoordinator::submit`]. The previous pending
//! request (timer or in-flight fetch) is cancelled, a new sequence number is
//! issued, and a background task sleeps for the debounce interval before
//! calling the [`SearchSource`]. Outcomes travel back over an unbounded
//! `tokio` channel and are handed out by [`FetchCoordinator::try_recv`] /
//! [`FetchCoordinator::recv`] only when their sequence number is still the
//! latest one issued.
//!
//! ```text
//! submit("ab") ─┬─ seq 1 ── sleep(debounce) ── cancelled by seq 2
//! submit("abc") ┴─ seq 2 ── sleep(debounce) ── search() ── FetchOutcome{seq 2}
//! ```
//!
//! `submit` spawns onto the ambient `tokio` runtime, so it must be called from
//! within one (a `#[tokio::test]`, or a thread holding a runtime guard).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{normalize_query, Entity, EntityKind, Scope};

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// One remote search, as handed to a [`SearchSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub kind: EntityKind,
    /// Normalised query text.
    pub query: String,
    pub scope: Scope,
    pub seq: u64,
}

/// Anything that can answer a search: the HTTP adapter in `shelf-remote`, or
/// an in-memory fake in tests.
pub trait SearchSource: Send + Sync + 'static {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<Vec<Entity>, SearchError>> + Send;
}

// ---------------------------------------------------------------------------
// Settings / outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub min_chars: usize,
    pub debounce: Duration,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for FetchSettings {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            min_chars: cfg.min_chars,
            debounce: cfg.debounce(),
            timeout: cfg.timeout(),
        }
    }
}

/// Result of one issued request, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub seq: u64,
    pub query: String,
    pub result: Result<Vec<Entity>, SearchError>,
}

/// What [`FetchCoordinator::submit`] did with a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Below `min_chars`; nothing scheduled, the caller clears its results.
    TooShort,
    /// A debounced request was scheduled under this sequence number.
    Scheduled(u64),
    /// The coordinator was shut down; nothing will ever be fetched again.
    Closed,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct FetchCoordinator<S> {
    source: Arc<S>,
    kind: EntityKind,
    scope: Scope,
    settings: FetchSettings,
    /// Sequence number of the newest request; only its outcome is applied.
    latest: u64,
    pending: Option<CancellationToken>,
    /// Parent of every request token; cancelled on shutdown.
    root: CancellationToken,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<S: SearchSource> FetchCoordinator<S> {
    pub fn new(source: Arc<S>, kind: EntityKind, settings: FetchSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            kind,
            scope: Scope::default(),
            settings,
            latest: 0,
            pending: None,
            root: CancellationToken::new(),
            tx,
            rx,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn settings(&self) -> FetchSettings {
        self.settings
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    pub fn is_closed(&self) -> bool {
        self.root.is_cancelled()
    }

    /// True while a request is waiting on its timer or in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// React to a query change. Always cancels the previous request first.
    pub fn submit(&mut self, raw_query: &str) -> Submission {
        if self.is_closed() {
            return Submission::Closed;
        }
        self.cancel();

        let query = normalize_query(raw_query);
        if query.chars().count() < self.settings.min_chars {
            tracing::debug!(query = %query, min_chars = self.settings.min_chars, "query too short, not fetching");
            return Submission::TooShort;
        }

        let seq = self.latest;
        let token = self.root.child_token();
        self.pending = Some(token.clone());

        let request = SearchRequest {
            kind: self.kind,
            query: query.clone(),
            scope: self.scope.clone(),
            seq,
        };
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let FetchSettings { debounce, timeout, .. } = self.settings;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(seq, "debounce cancelled before firing");
                    return;
                }
                _ = tokio::time::sleep(debounce) => {}
            }

            tracing::debug!(seq, query = %query, kind = %request.kind, "issuing search");
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(seq, "in-flight search cancelled");
                    return;
                }
                r = tokio::time::timeout(timeout, source.search(request)) => {
                    r.unwrap_or(Err(SearchError::Timeout(timeout)))
                }
            };

            // The receiver lives as long as the coordinator; a send error only
            // means the control was dropped mid-flight.
            let _ = tx.send(FetchOutcome { seq, query, result });
        });

        tracing::debug!(seq, "search scheduled");
        Submission::Scheduled(seq)
    }

    /// Cancel the pending request, if any, and invalidate every outcome that
    /// has already been queued.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        self.latest += 1;
    }

    /// Tear down: nothing scheduled fires, nothing new is accepted.
    pub fn shutdown(&mut self) {
        self.cancel();
        self.root.cancel();
        tracing::debug!(kind = %self.kind, "fetch coordinator shut down");
    }

    /// Next current outcome, without waiting. Stale outcomes are dropped.
    pub fn try_recv(&mut self) -> Option<FetchOutcome> {
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(current) = self.accept(outcome) {
                return Some(current);
            }
        }
        None
    }

    /// Wait for the next current outcome. Only await this when a request is
    /// pending; otherwise it never resolves.
    pub async fn recv(&mut self) -> Option<FetchOutcome> {
        loop {
            let outcome = self.rx.recv().await?;
            if let Some(current) = self.accept(outcome) {
                return Some(current);
            }
        }
    }

    fn accept(&mut self, outcome: FetchOutcome) -> Option<FetchOutcome> {
        if outcome.seq != self.latest {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest,
                "discarding stale search outcome"
            );
            return None;
        }
        self.pending = None;
        Some(outcome)
    }
}

impl<S> Drop for FetchCoordinator<S> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
