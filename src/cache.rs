//! Response cache for the model listing.
//!
//! Entries are keyed by the inbound request and hold a complete response. The
//! lifetime of an entry comes from the `Cache-Control: max-age` the response
//! was stored with; this module only enforces it, nothing here invalidates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache write failures. Never surfaced to clients.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache is full ({0} entries)")]
    Full(usize),

    #[error("response carries no max-age")]
    NotCacheable,
}

/// Identity of a cacheable request: method, path and query, hashed credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    path_and_query: String,
    credential: Option<String>,
}

impl CacheKey {
    pub fn from_request(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        let credential = headers
            .get(AUTHORIZATION)
            .map(|v| hex::encode(Sha256::digest(v.as_bytes())));

        Self {
            method: method.clone(),
            path_and_query,
            credential,
        }
    }
}

/// Immutable stored response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Freshness lifetime from `Cache-Control`. `no-store` wins over `max-age`.
    pub fn max_age(&self) -> Option<Duration> {
        let mut max_age = None;
        for value in self.headers.get_all(CACHE_CONTROL) {
            let Ok(value) = value.to_str() else { continue };
            for directive in value.split(',').map(str::trim) {
                if directive.eq_ignore_ascii_case("no-store") {
                    return None;
                }
                if let Some(secs) = directive.strip_prefix("max-age=") {
                    max_age = secs.parse().ok().map(Duration::from_secs);
                }
            }
        }
        max_age
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Key-value store for complete responses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<CachedResponse>;

    async fn put(&self, key: CacheKey, response: CachedResponse) -> Result<(), CacheError>;
}

/// Store `response` in the background. The caller never waits on, or sees, the write.
pub fn put_detached(cache: Arc<dyn ResponseCache>, key: CacheKey, response: CachedResponse) {
    tokio::spawn(async move {
        if let Err(e) = cache.put(key, response).await {
            debug!(error = %e, "cache write skipped");
        }
    });
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry and a fixed entry limit.
pub struct MemoryCache {
    capacity: usize,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.response.clone())
    }

    async fn put(&self, key: CacheKey, response: CachedResponse) -> Result<(), CacheError> {
        let ttl = response.max_age().ok_or(CacheError::NotCacheable)?;
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.capacity {
                return Err(CacheError::Full(self.capacity));
            }
        }

        // Last write wins.
        entries.insert(
            key,
            Entry {
                response,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
