use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::{HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use tracing::{debug, error, warn};

use crate::backend::Backend;
use crate::cache::{put_detached, CacheKey, CachedResponse, ResponseCache};
use crate::catalog::ModelSource;
use crate::errors::ProxyError;
use crate::protocol::HealthResponse;
use crate::server::proxy::{build_upstream_url, execute};

const HEALTH_MESSAGE: &str = "v1 endpoint is active and ready.";

/// Freshness advertised on, and enforced for, catalog responses.
pub const CATALOG_CACHE_CONTROL: &str = "public, max-age=3600";

/// Whether a catalog response came from the cache. Carried in response extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub models: Arc<dyn ModelSource>,
    pub cache: Arc<dyn ResponseCache>,
    pub http_client: reqwest::Client,
    pub upstream_timeout: Option<Duration>,
}

/// Health check handler. HEAD gets the same status and headers with no body.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}

pub async fn not_found() -> ProxyError {
    ProxyError::NotFound
}

/// Models endpoint: serves the normalized catalog, cached per request.
pub async fn models(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let key = CacheKey::from_request(&method, &uri, &headers);
    if let Some(cached) = state.cache.get(&key).await {
        debug!(path = uri.path(), "catalog cache hit");
        let mut response = cached.into_response();
        response.extensions_mut().insert(CacheOutcome::Hit);
        return Ok(response);
    }
    debug!(source = state.models.name(), "catalog cache miss");

    let credential = require_credential(&headers)?;
    let list = state.models.list_models(credential).await?;

    let body = serde_json::to_vec(&list).map_err(|e| ProxyError::Internal(e.to_string()))?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static(CATALOG_CACHE_CONTROL));

    let response = CachedResponse::new(StatusCode::OK, response_headers, Bytes::from(body));
    put_detached(state.cache.clone(), key, response.clone());

    let mut response = response.into_response();
    response.extensions_mut().insert(CacheOutcome::Miss);
    Ok(response)
}

/// Chat completions endpoint: streams the request to the backend and the reply back.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ProxyError> {
    if req.method() != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }
    let credential = require_credential(req.headers())?.clone();

    let backend = &state.backend;
    let upstream_url =
        build_upstream_url(backend.base_url(), backend.chat_completions_path()).map_err(|e| {
            error!(
                backend = backend.name(),
                base_url = backend.base_url(),
                path = backend.chat_completions_path(),
                error = %e,
                "failed to build upstream URL"
            );
            ProxyError::Internal(e.to_string())
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, credential);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    backend.apply_provider_headers(&mut headers);

    // Stream request body directly (no buffering)
    let body_stream = req.into_body().into_data_stream();
    let proxy_req = state
        .http_client
        .post(upstream_url)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body_stream))
        .build()
        .map_err(|e| {
            error!(backend = backend.name(), error = %e, "failed to create proxy request");
            ProxyError::Internal(e.to_string())
        })?;

    let resp = execute(
        &state.http_client,
        proxy_req,
        state.upstream_timeout,
        backend.name(),
    )
    .await?;

    Ok(passthrough(resp))
}

/// Return the upstream response as-is: status, headers, streaming body.
fn passthrough(resp: reqwest::Response) -> Response {
    let status = resp.status();
    let mut response_headers = HeaderMap::new();
    for (k, v) in resp.headers() {
        response_headers.append(k.clone(), v.clone());
    }

    let stream = resp.bytes_stream().map(|chunk| {
        chunk.map_err(|e| {
            warn!(error = %e, "error reading upstream response");
            std::io::Error::other(e)
        })
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    response
}

fn require_credential(headers: &HeaderMap) -> Result<&HeaderValue, ProxyError> {
    headers
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingCredential)
}
