pub mod normalize;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use http::header::{HeaderValue, AUTHORIZATION};
use http::HeaderMap;
use tracing::{error, warn};

use crate::backend::Backend;
use crate::errors::ProxyError;
use crate::protocol::{Model, ModelList, UpstreamModel};
use crate::server::proxy::{build_upstream_url, execute};

pub use normalize::normalize;

/// Where the `/v1/models` listing comes from.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Produce the normalized model list for a caller credential.
    async fn list_models(&self, credential: &HeaderValue) -> Result<ModelList, ProxyError>;
}

/// Live catalog fetched from the upstream provider on every call.
pub struct UpstreamCatalog {
    backend: Arc<dyn Backend>,
    http_client: reqwest::Client,
    timeout: Option<Duration>,
}

impl UpstreamCatalog {
    pub fn new(
        backend: Arc<dyn Backend>,
        http_client: reqwest::Client,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            backend,
            http_client,
            timeout,
        }
    }
}

#[async_trait]
impl ModelSource for UpstreamCatalog {
    fn name(&self) -> &str {
        "upstream"
    }

    async fn list_models(&self, credential: &HeaderValue) -> Result<ModelList, ProxyError> {
        let backend = &self.backend;
        let url = build_upstream_url(backend.base_url(), backend.catalog_path()).map_err(|e| {
            error!(
                backend = backend.name(),
                base_url = backend.base_url(),
                error = %e,
                "failed to build catalog URL"
            );
            ProxyError::Internal(e.to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credential.clone());
        backend.apply_provider_headers(&mut headers);

        let request = self
            .http_client
            .get(url.clone())
            .headers(headers)
            .build()
            .map_err(|e| ProxyError::Internal(e.to_string()))?;

        let resp = execute(&self.http_client, request, self.timeout, backend.name()).await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(
                backend = backend.name(),
                url = %url,
                status = status.as_u16(),
                "catalog request rejected by upstream"
            );
            return Err(ProxyError::UpstreamStatus(status));
        }

        let body = resp.bytes().await.map_err(|e| {
            error!(backend = backend.name(), error = %e, "failed to read catalog body");
            ProxyError::from_transport(&e)
        })?;

        let models: Vec<UpstreamModel> = serde_json::from_slice(&body).map_err(|e| {
            error!(backend = backend.name(), error = %e, "catalog body is not a model array");
            ProxyError::InvalidCatalog(e.to_string())
        })?;

        let now = Utc::now().timestamp();
        Ok(ModelList::new(
            models.into_iter().map(|m| normalize(m, now)).collect(),
        ))
    }
}

/// Fixed model list supplied at startup.
pub struct StaticCatalog {
    models: ModelList,
}

impl StaticCatalog {
    pub fn new(ids: &[String]) -> Self {
        let created = Utc::now().timestamp();
        let data = ids
            .iter()
            .map(|id| Model {
                id: id.clone(),
                object: "model".to_string(),
                created,
                owned_by: normalize::owner_from_id(id),
            })
            .collect();
        Self {
            models: ModelList::new(data),
        }
    }
}

#[async_trait]
impl ModelSource for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    async fn list_models(&self, _credential: &HeaderValue) -> Result<ModelList, ProxyError> {
        Ok(self.models.clone())
    }
}
