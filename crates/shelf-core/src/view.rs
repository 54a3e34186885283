//! Presentation contract: a render-ready snapshot of a [`Selector`].
//!
//! Front ends never reach into selector internals; they call
//! [`Selector::view`] and draw what comes back.

use crate::coordinator::SearchSource;
use crate::format::{format_amount, format_percent, format_quantity};
use crate::selector::{SearchStatus, Selector};
use crate::types::EntityId;

/// Formatting knobs taken from the `[ui]` config section.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub currency: String,
    pub show_stock: bool,
    /// Overrides the default "Select a product…" placeholder.
    pub placeholder: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            currency: "₽".to_string(),
            show_stock: true,
            placeholder: None,
        }
    }
}

impl From<&crate::config::UiConfig> for ViewOptions {
    fn from(ui: &crate::config::UiConfig) -> Self {
        Self {
            currency: ui.currency.clone(),
            show_stock: ui.show_stock,
            placeholder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerView {
    /// Selected label from the cache; `None` means show the placeholder.
    pub label: Option<String>,
    pub placeholder: String,
    /// A clear affordance should be shown.
    pub clearable: bool,
    pub disabled: bool,
}

impl TriggerView {
    pub fn text(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: EntityId,
    pub primary: String,
    /// Code and secondary identifier joined, e.g. `"SP-4 · 4601234567890"`.
    pub secondary: Option<String>,
    pub price: Option<String>,
    /// Backend `discount` field, already a percentage.
    pub discount: Option<String>,
    pub stock: Option<String>,
    pub highlighted: bool,
    pub selected: bool,
}

/// Line shown under (or instead of) the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Loading,
    TooShort { min_chars: usize },
    Empty { message: String },
    Failed { message: String },
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusLine::Loading => write!(f, "Searching…"),
            StatusLine::TooShort { min_chars } => {
                write!(f, "Type at least {min_chars} characters to search")
            }
            StatusLine::Empty { message } | StatusLine::Failed { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorView {
    pub trigger: TriggerView,
    pub open: bool,
    pub query: String,
    pub items: Vec<ItemView>,
    pub status: Option<StatusLine>,
}

impl<S: SearchSource> Selector<S> {
    pub fn view(&self, opts: &ViewOptions) -> SelectorView {
        let kind = self.kind();
        let trigger = TriggerView {
            label: self.selection().label().map(str::to_string),
            placeholder: opts
                .placeholder
                .clone()
                .unwrap_or_else(|| format!("Select a {}…", kind.singular())),
            clearable: self.is_clearable() && self.selection().id().is_some(),
            disabled: self.is_disabled(),
        };

        let highlight = self.highlight();
        let items = self
            .results()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let secondary = [e.code.as_deref(), e.secondary.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" · ");
                ItemView {
                    id: e.id.clone(),
                    primary: e.name.clone(),
                    secondary: (!secondary.is_empty()).then_some(secondary),
                    price: kind
                        .has_pricing()
                        .then_some(e.price)
                        .flatten()
                        .map(|p| format_amount(p, &opts.currency)),
                    discount: e
                        .extra
                        .get("discount")
                        .and_then(serde_json::Value::as_f64)
                        .filter(|d| kind.has_pricing() && *d != 0.0)
                        .map(format_percent),
                    stock: (kind.has_pricing() && opts.show_stock)
                        .then_some(e.stock)
                        .flatten()
                        .map(format_quantity),
                    highlighted: highlight == Some(i),
                    selected: self.selection().is_selected(&e.id),
                }
            })
            .collect::<Vec<_>>();

        let status = match self.status() {
            SearchStatus::Loading => Some(StatusLine::Loading),
            SearchStatus::TooShort => Some(StatusLine::TooShort {
                min_chars: self.min_chars(),
            }),
            SearchStatus::Failed(err) if items.is_empty() => Some(StatusLine::Failed {
                message: format!("Search failed: {err}"),
            }),
            SearchStatus::Failed(_) => Some(StatusLine::Failed {
                message: "Search failed, showing offline list".to_string(),
            }),
            SearchStatus::Ready if items.is_empty() => Some(StatusLine::Empty {
                message: format!("No {} found", kind.plural()),
            }),
            SearchStatus::Ready | SearchStatus::Idle => None,
        };

        SelectorView {
            trigger,
            open: self.is_open(),
            query: self.query().to_string(),
            items,
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
