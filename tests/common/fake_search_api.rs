//! Fake back-office search API for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /api/{plural}/search?q=...` with the configured records whose
//!   string fields contain `q` (case-insensitive); `in_stock=1` drops
//!   records without positive `stock`
//!
//! Every request is recorded (path, query parameters and the session
//! headers) so tests can assert on what the client actually sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use common::fake_search_api::FakeSearchApi;
//!
//! let api = FakeSearchApi::start().await.unwrap();
//! api.add_records("products", vec![json!({"id": 1, "name": "Brake pads"})]).await;
//! api.fail_with("customers", 503, "text/html", "<h1>down</h1>").await;
//!
//! let source = HttpSource::new(api.base_url());
//! ```

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as the server saw it.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
    pub cookie: Option<String>,
    pub accept: Option<String>,
}

#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    content_type: String,
    body: String,
}

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    /// Records per plural entity name (`products`, `customers`, ...).
    records: HashMap<String, Vec<Value>>,
    failures: HashMap<String, Failure>,
    /// Wrap matches in `{"data": [...]}` instead of a bare array.
    envelope: bool,
    delay: Duration,
    requests: Vec<RecordedRequest>,
}

/// Handle to the running fake search API.
pub struct FakeSearchApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeSearchApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Arc<Mutex<ApiState>> = Arc::new(Mutex::new(ApiState::default()));

        let router = Router::new()
            .route("/api/{plural}/search", get(search))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self { addr, state })
    }

    /// Base URL without a trailing slash, e.g. `"http://127.0.0.1:54321"`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn add_records(&self, plural: &str, records: Vec<Value>) {
        self.state
            .lock()
            .await
            .records
            .entry(plural.to_string())
            .or_default()
            .extend(records);
    }

    /// Answer every search for `plural` with `status` and a raw body.
    pub async fn fail_with(&self, plural: &str, status: u16, content_type: &str, body: &str) {
        self.state.lock().await.failures.insert(
            plural.to_string(),
            Failure {
                status: StatusCode::from_u16(status).unwrap(),
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
    }

    pub async fn use_envelope(&self) {
        self.state.lock().await.envelope = true;
    }

    /// Hold every response for `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

async fn search(
    Path(plural): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let (delay, failure, envelope, matches) = {
        let mut state = state.lock().await;
        state.requests.push(RecordedRequest {
            path: format!("/api/{plural}/search"),
            params: params.clone(),
            authorization: header_value(header::AUTHORIZATION),
            cookie: header_value(header::COOKIE),
            accept: header_value(header::ACCEPT),
        });

        let needle = params.get("q").map(|q| q.to_lowercase()).unwrap_or_default();
        let in_stock = params.get("in_stock").is_some_and(|v| v == "1");
        let matches: Vec<Value> = state
            .records
            .get(&plural)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| record_matches(r, &needle))
                    .filter(|r| !in_stock || r["stock"].as_f64().is_some_and(|s| s > 0.0))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        (
            state.delay,
            state.failures.get(&plural).cloned(),
            state.envelope,
            matches,
        )
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Some(failure) = failure {
        return (
            failure.status,
            [(header::CONTENT_TYPE, failure.content_type)],
            failure.body,
        )
            .into_response();
    }

    if envelope {
        Json(serde_json::json!({ "data": matches, "total": matches.len() })).into_response()
    } else {
        Json(matches).into_response()
    }
}

fn record_matches(record: &Value, needle: &str) -> bool {
    let Some(obj) = record.as_object() else {
        return false;
    };
    obj.values()
        .filter_map(Value::as_str)
        .any(|s| s.to_lowercase().contains(needle))
}
