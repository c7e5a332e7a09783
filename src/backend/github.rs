use http::header::{HeaderValue, ACCEPT};

use super::Backend;

pub const DEFAULT_BASE_URL: &str = "https://models.github.ai";
pub const DEFAULT_CATALOG_PATH: &str = "/catalog/models";
pub const DEFAULT_CHAT_PATH: &str = "/inference/chat/completions";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// GitHub Models backend configuration.
pub struct GitHubModelsConfig {
    pub base_url: Option<String>,
    pub catalog_path: Option<String>,
    pub chat_path: Option<String>,
    pub api_version: String,
}

/// GitHub Models backend: catalog and chat endpoints under one provider base.
pub struct GitHubModels {
    base_url: String,
    catalog_path: String,
    chat_path: String,
    api_version: HeaderValue,
}

impl GitHubModels {
    pub fn new(config: GitHubModelsConfig) -> Result<Self, http::header::InvalidHeaderValue> {
        Ok(Self {
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            catalog_path: config
                .catalog_path
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.into()),
            chat_path: config.chat_path.unwrap_or_else(|| DEFAULT_CHAT_PATH.into()),
            api_version: HeaderValue::from_str(&config.api_version)?,
        })
    }
}

impl Backend for GitHubModels {
    fn name(&self) -> &str {
        "github-models"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn catalog_path(&self) -> &str {
        &self.catalog_path
    }

    fn chat_completions_path(&self) -> &str {
        &self.chat_path
    }

    fn apply_provider_headers(&self, headers: &mut http::HeaderMap) {
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, self.api_version.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GitHubModels {
        GitHubModels::new(GitHubModelsConfig {
            base_url: None,
            catalog_path: None,
            chat_path: None,
            api_version: DEFAULT_API_VERSION.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let b = backend();
        assert_eq!(b.base_url(), "https://models.github.ai");
        assert_eq!(b.catalog_path(), "/catalog/models");
        assert_eq!(b.chat_completions_path(), "/inference/chat/completions");
    }

    #[test]
    fn test_provider_headers_replace_client_values() {
        let mut headers = http::HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        backend().apply_provider_headers(&mut headers);
        assert_eq!(headers[ACCEPT], "application/vnd.github+json");
        assert_eq!(headers["X-GitHub-Api-Version"], "2022-11-28");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_rejects_invalid_api_version() {
        let result = GitHubModels::new(GitHubModelsConfig {
            base_url: None,
            catalog_path: None,
            chat_path: None,
            api_version: "bad\nversion".into(),
        });
        assert!(result.is_err());
    }
}
