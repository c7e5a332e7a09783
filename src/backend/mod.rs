pub mod github;

pub use github::{GitHubModels, GitHubModelsConfig};

/// Upstream inference provider the proxy forwards to.
pub trait Backend: Send + Sync {
    /// Human-readable name for this backend.
    fn name(&self) -> &str;

    /// Base URL for API requests.
    fn base_url(&self) -> &str;

    /// Path of the model catalog endpoint, relative to the base URL.
    fn catalog_path(&self) -> &str;

    /// Path of the chat completions endpoint, relative to the base URL.
    fn chat_completions_path(&self) -> &str;

    /// Add the fixed provider headers (media type, API version) to an outgoing request.
    fn apply_provider_headers(&self, headers: &mut http::HeaderMap);
}
