//! Dropdown interaction controller.
//!
//! Two states, no terminal state: the control cycles between `Closed` and
//! `Open` for its whole lifetime.
//!
//! | From   | Trigger                                   | To     |
//! |--------|-------------------------------------------|--------|
//! | Closed | trigger activated (not disabled)          | Open   |
//! | Open   | explicit close, selection, outside click, Escape, teardown | Closed |
//!
//! The highlight moves circularly over whatever result list is visible.

use std::time::Duration;

use crate::config::OpenPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Explicit,
    Selection,
    OutsideClick,
    Escape,
    Teardown,
}

/// Side effects requested by a `Closed → Open` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenEffect {
    /// Clear the query before showing the list.
    pub reset_query: bool,
    /// Focus the search field once this much time has passed, letting layout
    /// settle first.
    pub focus_search_after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct Dropdown {
    state: DropdownState,
    highlight: Option<usize>,
    disabled: bool,
    policy: OpenPolicy,
    focus_delay: Duration,
}

impl Dropdown {
    pub fn new(policy: OpenPolicy, focus_delay: Duration) -> Self {
        Self {
            state: DropdownState::Closed,
            highlight: None,
            disabled: false,
            policy,
            focus_delay,
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn policy(&self) -> OpenPolicy {
        self.policy
    }

    /// Disabling an open dropdown closes it.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close(CloseReason::Explicit);
        }
    }

    /// `Closed → Open`. Returns `None` when disabled or already open.
    pub fn open(&mut self) -> Option<OpenEffect> {
        if self.disabled || self.is_open() {
            return None;
        }
        self.state = DropdownState::Open;
        self.highlight = None;
        tracing::debug!(policy = ?self.policy, "dropdown opened");
        Some(OpenEffect {
            reset_query: self.policy == OpenPolicy::Reset,
            focus_search_after: self.focus_delay,
        })
    }

    /// `Open → Closed`. Returns whether the state changed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = DropdownState::Closed;
        self.highlight = None;
        tracing::debug!(?reason, "dropdown closed");
        true
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn reset_highlight(&mut self) {
        self.highlight = None;
    }

    pub fn set_highlight(&mut self, index: Option<usize>, len: usize) {
        self.highlight = index.filter(|&i| i < len);
    }

    /// Move the highlight one step, wrapping at both ends. With nothing
    /// highlighted, `Down` lands on the first row and `Up` on the last.
    pub fn step(&mut self, step: Step, len: usize) {
        if len == 0 {
            self.highlight = None;
            return;
        }
        self.highlight = Some(match (self.highlight, step) {
            (None, Step::Down) => 0,
            (None, Step::Up) => len - 1,
            (Some(i), Step::Down) => (i + 1) % len,
            (Some(i), Step::Up) => (i + len - 1) % len,
        });
    }
}

impl Default for Dropdown {
    fn default() -> Self {
        Self::new(OpenPolicy::default(), Duration::from_millis(50))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
