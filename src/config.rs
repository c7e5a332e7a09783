use clap::{Parser, ValueEnum};

use crate::backend::github::{
    DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CATALOG_PATH, DEFAULT_CHAT_PATH,
};

/// Models Gateway: OpenAI-compatible proxy for the GitHub Models API.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Listen address (e.g. ":8787" or "0.0.0.0:8787")
    #[arg(long, default_value = ":8787", env = "ADDR")]
    pub addr: String,

    /// Log format: "text" or "json"
    #[arg(long, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: String,

    /// Upstream provider base URL
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "UPSTREAM_BASE_URL")]
    pub upstream_base_url: String,

    /// Model catalog endpoint, relative to the base URL
    #[arg(long, default_value = DEFAULT_CATALOG_PATH, env = "CATALOG_PATH")]
    pub catalog_path: String,

    /// Chat completions endpoint, relative to the base URL
    #[arg(long, default_value = DEFAULT_CHAT_PATH, env = "CHAT_PATH")]
    pub chat_path: String,

    /// Value sent in the provider API-version header
    #[arg(long, default_value = DEFAULT_API_VERSION, env = "UPSTREAM_API_VERSION")]
    pub api_version: String,

    /// Seconds to wait for upstream response headers (unset: no limit)
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Answer OPTIONS preflights and add CORS headers to every response
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, env = "CORS")]
    pub cors: bool,

    /// Treat "/" as an alias of the chat completions endpoint
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, env = "ROOT_ALIAS_CHAT")]
    pub root_alias_chat: bool,

    /// Response to non-GET/HEAD requests on the health path
    #[arg(long, value_enum, default_value_t = HealthFallback::NotFound, env = "HEALTH_FALLBACK")]
    pub health_fallback: HealthFallback,

    /// Comma-separated model ids to serve instead of the upstream catalog
    #[arg(long, env = "STATIC_MODELS")]
    pub static_models: Option<String>,

    /// Maximum number of cached model listings
    #[arg(long, default_value_t = 1024, env = "CACHE_CAPACITY")]
    pub cache_capacity: usize,
}

/// What the health path answers to methods other than GET and HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HealthFallback {
    NotFound,
    MethodNotAllowed,
}

/// Parse a comma-separated list, trimming whitespace and filtering empties.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_whitespace() {
        assert_eq!(
            parse_list("openai/gpt-4o, phi-4 ,meta/llama"),
            vec!["openai/gpt-4o", "phi-4", "meta/llama"]
        );
    }

    #[test]
    fn test_parse_list_filters_empties() {
        assert_eq!(parse_list("a,, ,b,"), vec!["a", "b"]);
        assert!(parse_list(", ,").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["models-gateway"]);
        assert_eq!(config.addr, ":8787");
        assert!(config.cors);
        assert!(config.root_alias_chat);
        assert_eq!(config.health_fallback, HealthFallback::NotFound);
        assert!(config.upstream_timeout_secs.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::parse_from([
            "models-gateway",
            "--cors",
            "false",
            "--root-alias-chat",
            "false",
            "--health-fallback",
            "method-not-allowed",
            "--static-models",
            "a,b",
        ]);
        assert!(!config.cors);
        assert!(!config.root_alias_chat);
        assert_eq!(config.health_fallback, HealthFallback::MethodNotAllowed);
        assert_eq!(config.static_models.as_deref(), Some("a,b"));
    }
}
