//! Command-line surface of the `shelf` binary.
//!
//! Parsing lives here (not in `main.rs`) so integration tests can build a
//! selector exactly the way the binary does.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use shelf_core::config::Config;
use shelf_core::{Entity, EntityKind, Scope, Selector};
use shelf_remote::{decode_entities, HttpSource};

#[derive(Debug, Parser)]
#[command(
    name = "shelf",
    about = "Pick a back-office entity from a searchable list",
    long_about = "Opens a terminal picker for one entity kind. Lists of up to \
                  [search] local_threshold candidates are filtered locally; \
                  anything larger (or no list at all) is searched on the \
                  remote endpoint. The picked entity is printed as JSON."
)]
pub struct Cli {
    /// Entity to pick: product, customer, supplier, warehouse, employee,
    /// branch or vehicle (singular or plural).
    pub kind: EntityKind,

    /// Base URL of the search API. Overrides `[remote] base_url`.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Search path. Defaults to `/api/<plural>/search`.
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// JSON file with a static candidate list (array, or an object with a
    /// `data` / `results` / `items` array).
    #[arg(long, value_name = "FILE.json")]
    pub candidates: Option<PathBuf>,

    /// Only offer entities with stock on hand.
    #[arg(long)]
    pub in_stock: bool,

    /// Extra search filter forwarded to the endpoint; repeatable.
    #[arg(long = "scope", value_name = "KEY=VALUE", value_parser = parse_scope_pair)]
    pub scope: Vec<(String, String)>,

    /// Id of the initially selected entity.
    #[arg(long, value_name = "ID")]
    pub value: Option<String>,

    /// The field is required: the selection cannot be cleared.
    #[arg(long)]
    pub required: bool,

    /// Extra config file layered over `~/.config/shelf/config.toml`.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write debug logs to /tmp/shelf-debug.log (tail -f to inspect).
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn scope(&self) -> Scope {
        let scope = self
            .scope
            .iter()
            .fold(Scope::default(), |scope, (k, v)| scope.param(k, v));
        if self.in_stock {
            scope.in_stock_only()
        } else {
            scope
        }
    }

    pub fn search_source(&self, config: &Config) -> HttpSource {
        let mut remote = config.remote.clone();
        if let Some(endpoint) = &self.endpoint {
            remote.base_url = endpoint.clone();
        }
        let source = HttpSource::from_config(&remote);
        match &self.path {
            Some(path) => source.with_path(path.clone()),
            None => source,
        }
    }

    /// Build the selector the picker drives.
    pub fn build_selector(&self, config: &Config) -> anyhow::Result<Selector<HttpSource>> {
        let mut builder = Selector::<HttpSource>::builder(self.kind)
            .source(std::sync::Arc::new(self.search_source(config)))
            .scope(self.scope())
            .search_config(config.search.clone())
            .clearable(!self.required);
        if let Some(path) = &self.candidates {
            builder = builder.candidates(load_candidates(self.kind, path)?);
        }
        if let Some(id) = &self.value {
            builder = builder.value(id.as_str());
        }
        Ok(builder.build()?)
    }
}

/// `key=value` → `(key, value)`.
pub fn parse_scope_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

/// Read a static candidate list from disk, in the same shapes the search
/// endpoint returns.
pub fn load_candidates(kind: EntityKind, path: &Path) -> anyhow::Result<Vec<Entity>> {
    let body = std::fs::read(path)
        .with_context(|| format!("reading candidates from {}", path.display()))?;
    let entities = decode_entities(kind, &body)
        .with_context(|| format!("parsing candidates in {}", path.display()))?;
    tracing::info!(%kind, count = entities.len(), path = %path.display(), "candidates loaded");
    Ok(entities)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "shelf",
            "products",
            "--endpoint",
            "http://erp.local",
            "--in-stock",
            "--scope",
            "warehouse_id=3",
            "--scope",
            "service_type = repair",
            "--value",
            "42",
            "--required",
        ])
        .unwrap();

        assert_eq!(cli.kind, EntityKind::Product);
        assert_eq!(cli.endpoint.as_deref(), Some("http://erp.local"));
        assert!(cli.required);
        assert_eq!(
            cli.scope().query_pairs(),
            vec![
                ("warehouse_id", "3"),
                ("service_type", "repair"),
                ("in_stock", "1")
            ]
        );
    }

    #[test]
    fn rejects_unknown_kind_and_bad_scope() {
        assert!(Cli::try_parse_from(["shelf", "spaceship"]).is_err());
        assert!(Cli::try_parse_from(["shelf", "customer", "--scope", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["shelf", "customer", "--scope", "=x"]).is_err());
    }
}
