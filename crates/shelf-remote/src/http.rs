//! HTTP search source: `GET <base><path>?q=<query>&<scope>` against the
//! back-office API.
//!
//! Uses a `hyper` client over plain HTTP. The ambient session is forwarded as
//! a bearer token and/or a raw `Cookie` header taken from `[remote]` config.
//! Any non-2xx status, non-JSON content type or undecodable body is a
//! [`SearchError`]; the selector turns that into an empty "search failed"
//! state.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use shelf_core::config::RemoteConfig;
use shelf_core::{Entity, EntityKind, SearchError, SearchRequest, SearchSource};

/// Keys under which paginated endpoints nest the entity array.
const ENVELOPE_KEYS: &[&str] = &["data", "results", "items"];

pub struct HttpSource {
    client: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    path: Option<String>,
    token: Option<String>,
    cookie: Option<String>,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path: None,
            token: None,
            cookie: None,
        }
    }

    pub fn from_config(remote: &RemoteConfig) -> Self {
        let mut source = Self::new(remote.base_url.clone());
        source.token = remote.token.clone();
        source.cookie = remote.cookie.clone();
        source
    }

    /// Override the per-kind default endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Full request URI for `request`.
    pub fn request_uri(&self, request: &SearchRequest) -> Result<Uri, SearchError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| request.kind.endpoint_path());
        let mut url = format!(
            "{}{}?q={}",
            self.base_url,
            path,
            urlencoding::encode(&request.query)
        );
        for (key, value) in request.scope.query_pairs() {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url.parse::<Uri>()
            .map_err(|e| SearchError::Transport(format!("invalid search URL {url:?}: {e}")))
    }

    async fn fetch(&self, request: SearchRequest) -> Result<Vec<Entity>, SearchError> {
        let uri = self.request_uri(&request)?;
        tracing::debug!(seq = request.seq, %uri, "GET search endpoint");

        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie.as_str());
        }
        let http_request = builder
            .body(Empty::<Bytes>::new())
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !content_type.contains("json") {
                return Err(SearchError::Decode(format!(
                    "expected application/json, got {content_type:?}"
                )));
            }
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?
            .to_bytes();

        decode_entities(request.kind, &body)
    }
}

impl SearchSource for HttpSource {
    async fn search(&self, request: SearchRequest) -> Result<Vec<Entity>, SearchError> {
        self.fetch(request).await
    }
}

/// Decode a search response body: a bare JSON array, or an object wrapping
/// the array under `data` / `results` / `items`. Elements that cannot be
/// mapped to an entity are skipped with a warning.
pub fn decode_entities(kind: EntityKind, body: &[u8]) -> Result<Vec<Entity>, SearchError> {
    let value: Value = serde_json::from_slice(body)?;
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => ENVELOPE_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
            .ok_or_else(|| {
                SearchError::Decode("response object has no data/results/items array".to_string())
            })?,
        _ => {
            return Err(SearchError::Decode(
                "response is neither an array nor an object".to_string(),
            ))
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| match Entity::from_json(kind, item) {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(%kind, error = %err, "skipping malformed search result");
                None
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
