#![allow(unused)]
//! Remote search integration harness.
//!
//! # What this covers
//!
//! The HTTP path from a selector to a search endpoint, against a fake
//! back-office API served by `axum` on 127.0.0.1 (see
//! `common::fake_search_api`). These tests run on the real clock with a
//! short debounce.
//!
//! - **Request shape**: `GET /api/<plural>/search?q=<normalised query>` plus
//!   scope parameters, `Accept: application/json` and the configured
//!   session headers (bearer token, cookie).
//! - **Response shapes**: bare arrays, `{"data": [...]}` envelopes and the
//!   per-kind alternate field names (`title`, `ean`, `retail_price`, `qty`).
//! - **Failures**: non-2xx statuses, non-JSON bodies, refused connections and
//!   timeouts surface as the matching `SearchError` and never panic.
//! - **CLI wiring**: a selector built from parsed command-line arguments
//!   talks to `--endpoint`, forwards `--scope` / `--in-stock`, and stays
//!   offline when `--candidates` holds a small list.
//!
//! # What this does NOT cover
//!
//! - Debounce timing and stale-response ordering (see selector_harness,
//!   which runs them on a paused clock)
//! - TLS endpoints
//!
//! # Running
//!
//! ```sh
//! cargo test --test remote_harness
//! cargo test --test remote_harness -- --nocapture
//! ```

mod common;
use common::fake_search_api::FakeSearchApi;
use common::*;

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use shelf::Cli;
use shelf_core::config::Config;
use shelf_core::search::ModeKind;
use shelf_core::{
    EntityKind, Key, Scope, SearchError, SearchRequest, SearchSource, SearchStatus, Selector,
};
use shelf_remote::HttpSource;

fn request(kind: EntityKind, query: &str, scope: Scope) -> SearchRequest {
    SearchRequest {
        kind,
        query: query.to_string(),
        scope,
        seq: 1,
    }
}

/// Defaults with a debounce short enough for real-time tests.
fn fast_config(base_url: &str) -> Config {
    let mut config = Config::defaults();
    config.search.debounce_ms = 20;
    config.remote.base_url = base_url.to_string();
    config
}

fn candidates_on_disk(records: &[serde_json::Value]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(candidates_file(records).as_bytes()).unwrap();
    file
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_query_scope_and_session_headers() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("products", product_records()).await;

    let source = HttpSource::new(api.base_url())
        .with_token("secret-token")
        .with_cookie("sessionid=abc; csrftoken=xyz");
    let scope = Scope::default().param("warehouse_id", "3");
    let entities = source
        .search(request(EntityKind::Product, "brake pads", scope))
        .await
        .unwrap();

    let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Brake pads front", "Brake pads rear"]);
    let front = &entities[0];
    assert_eq!(front.code.as_deref(), Some("BP-F"));
    assert_eq!(front.secondary.as_deref(), Some("4601234567890"));
    assert_eq!(front.price, Some(2490.0));
    assert_eq!(front.stock, Some(12.0));

    let requests = api.requests().await;
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.path, "/api/products/search");
    assert_eq!(sent.params.get("q").map(String::as_str), Some("brake pads"));
    assert_eq!(sent.params.get("warehouse_id").map(String::as_str), Some("3"));
    assert_eq!(sent.authorization.as_deref(), Some("Bearer secret-token"));
    assert_eq!(
        sent.cookie.as_deref(),
        Some("sessionid=abc; csrftoken=xyz")
    );
    assert_eq!(sent.accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn envelope_and_alternate_field_names_decode() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("products", product_records()).await;
    api.use_envelope().await;

    let source = HttpSource::new(format!("{}/", api.base_url()));
    let entities = source
        .search(request(EntityKind::Product, "bolt", Scope::default()))
        .await
        .unwrap();

    assert_eq!(entities.len(), 1);
    let bolt = &entities[0];
    assert_eq!(bolt.id.as_str(), "104");
    assert_eq!(bolt.name, "Bolt M8");
    assert_eq!(bolt.code.as_deref(), Some("BM8"));
    assert_eq!(bolt.secondary.as_deref(), Some("4600000000008"));
    assert_eq!(bolt.price, Some(12.0));
    assert_eq!(bolt.stock, Some(1000.0));
}

#[tokio::test]
async fn custom_path_overrides_the_kind_default() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("clients", customer_records()).await;

    let source = HttpSource::new(api.base_url()).with_path("/api/clients/search");
    let entities = source
        .search(request(EntityKind::Customer, "ivan", Scope::default()))
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name, "Ivan Petrov");
    assert_eq!(entities[0].secondary.as_deref(), Some("+7 901 765 4321"));
}

#[rstest]
#[case::server_error(503, "application/json", r#"{"detail":"maintenance"}"#, "status")]
#[case::not_found(404, "text/html", "<h1>Not Found</h1>", "status")]
#[case::login_page(200, "text/html; charset=utf-8", "<html>login</html>", "decode")]
#[case::object_without_list(200, "application/json", r#"{"error":"bad query"}"#, "decode")]
#[case::truncated_json(200, "application/json", r#"[{"id": 1, "name": "Ja"#, "decode")]
#[tokio::test]
async fn bad_responses_map_to_search_errors(
    #[case] status: u16,
    #[case] content_type: &str,
    #[case] body: &str,
    #[case] expected: &str,
) {
    let api = FakeSearchApi::start().await.unwrap();
    api.fail_with("customers", status, content_type, body).await;

    let err = HttpSource::new(api.base_url())
        .search(request(EntityKind::Customer, "jane", Scope::default()))
        .await
        .unwrap_err();
    match expected {
        "status" => assert_eq!(err, SearchError::Status { status }),
        _ => assert!(matches!(err, SearchError::Decode(_)), "{err:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = HttpSource::new(format!("http://127.0.0.1:{port}"))
        .search(request(EntityKind::Customer, "jane", Scope::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// Selector over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cli_selector_searches_the_endpoint() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("customers", customer_records()).await;

    let base = api.base_url();
    let cli = Cli::try_parse_from(["shelf", "customers", "--endpoint", base.as_str(), "--scope", "group=retail"])
        .unwrap();
    let mut config = fast_config("http://unused.invalid");
    config.remote.token = Some("secret".to_string());
    let mut selector = cli.build_selector(&config).unwrap();
    assert_eq!(selector.mode(), ModeKind::Remote);

    selector.open();
    selector.set_query("Roe");
    assert!(selector.settle().await);
    assert_results!(selector, ["Jane Roe", "Roe & Sons"]);

    let sent = api.requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].params.get("q").map(String::as_str), Some("roe"));
    assert_eq!(sent[0].params.get("group").map(String::as_str), Some("retail"));
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer secret"));

    selector.handle_key(Key::Down);
    selector.handle_key(Key::Enter);
    assert_selected!(selector, "Jane Roe");
}

#[tokio::test]
async fn in_stock_flag_reaches_the_endpoint_and_filters_results() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("products", product_records()).await;

    let cli = Cli::try_parse_from(["shelf", "product", "--in-stock"]).unwrap();
    let mut selector = cli.build_selector(&fast_config(&api.base_url())).unwrap();
    selector.open();
    selector.set_query("brake");
    selector.settle().await;

    assert_results!(selector, ["Brake pads front"]);
    let sent = api.requests().await;
    assert_eq!(sent[0].params.get("in_stock").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn small_candidates_file_never_touches_the_network() {
    let api = FakeSearchApi::start().await.unwrap();
    let file = candidates_on_disk(&customer_records());

    let path = file.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from(["shelf", "customer", "--candidates", path.as_str(), "--value", "3"]).unwrap();
    let mut selector = cli.build_selector(&fast_config(&api.base_url())).unwrap();
    assert_eq!(selector.mode(), ModeKind::Local);
    assert_selected!(selector, "Ivan Petrov");

    selector.open();
    selector.set_query("roe");
    assert_results!(selector, ["Jane Roe", "Roe & Sons"]);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(api.requests().await.is_empty());
}

#[tokio::test]
async fn server_failure_falls_back_to_large_candidates_file() {
    let api = FakeSearchApi::start().await.unwrap();
    api.fail_with("suppliers", 500, "text/plain", "boom").await;

    let records: Vec<serde_json::Value> = (1..=25)
        .map(|i| json!({"id": i, "name": format!("Supplier {i:02}"), "code": format!("SUP-{i:03}")}))
        .collect();
    let file = candidates_on_disk(&records);
    let path = file.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from(["shelf", "suppliers", "--candidates", path.as_str()]).unwrap();
    let mut selector = cli.build_selector(&fast_config(&api.base_url())).unwrap();
    assert_eq!(selector.mode(), ModeKind::Remote);

    selector.open();
    selector.set_query("supplier 2");
    selector.settle().await;

    assert_status!(selector, SearchStatus::Failed(SearchError::Status { status: 500 }));
    assert_eq!(selector.results().len(), 6);
    assert!(selector.is_open());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let api = FakeSearchApi::start().await.unwrap();
    api.add_records("customers", customer_records()).await;
    api.set_delay(Duration::from_millis(500)).await;

    let mut config = fast_config(&api.base_url());
    config.search.timeout_ms = 100;
    let cli = Cli::try_parse_from(["shelf", "customer"]).unwrap();
    let mut selector = cli.build_selector(&config).unwrap();

    selector.open();
    selector.set_query("jane");
    selector.settle().await;
    assert_status!(selector, SearchStatus::Failed(SearchError::Timeout(_)));
    assert!(selector.results().is_empty());
}

#[tokio::test]
async fn missing_candidates_file_is_reported() {
    let cli = Cli::try_parse_from(["shelf", "customer", "--candidates", "/nonexistent/shelf.json"])
        .unwrap();
    let err = cli
        .build_selector(&Config::defaults())
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("reading candidates"), "{err:#}");
}
