use std::time::Duration;

use tracing::error;
use url::Url;

use crate::errors::ProxyError;

/// Build the upstream URL from base URL and endpoint path.
pub fn build_upstream_url(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut parsed = Url::parse(base_url)?;

    let normalized_base = parsed.path().trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');

    let full_path = if normalized_base.is_empty() || normalized_base == "/" {
        if trimmed_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed_path}")
        }
    } else if trimmed_path.is_empty() {
        normalized_base.to_string()
    } else {
        format!("{normalized_base}/{trimmed_path}")
    };

    parsed.set_path(&full_path);
    parsed.set_query(None);

    Ok(parsed)
}

/// Execute an upstream request, optionally bounding the wait for response headers.
/// The response body is not covered by the timeout.
pub async fn execute(
    client: &reqwest::Client,
    request: reqwest::Request,
    timeout: Option<Duration>,
    backend: &str,
) -> Result<reqwest::Response, ProxyError> {
    let url = request.url().to_string();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, client.execute(request)).await {
            Ok(result) => result,
            Err(_) => {
                error!(backend, url, "upstream request timed out");
                return Err(ProxyError::UpstreamTimeout);
            }
        },
        None => client.execute(request).await,
    };

    result.map_err(|e| {
        error!(backend, url, error = %e, "upstream request failed");
        ProxyError::from_transport(&e)
    })
}
