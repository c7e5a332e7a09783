pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod proxy;


use std::sync::Arc;

use axum::extract::Request;
use axum::http::Uri;
use axum::middleware as axum_middleware;
use axum::routing::{any, get};
use axum::Router;
use tower::util::MapRequest;

use crate::config::HealthFallback;

use self::handlers::AppState;

pub const API_PREFIX: &str = "/v1";
pub const HEALTH_PATH: &str = "/v1";
pub const MODELS_PATH: &str = "/v1/models";
pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const LEGACY_CHAT_PATH: &str = "/api/openai";
pub const ROOT_PATH: &str = "/";

/// Path a request arrived with before the duplicated prefix was stripped.
#[derive(Debug, Clone)]
pub struct RewrittenFrom(pub String);

/// Routing switches fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub cors: bool,
    pub root_alias_chat: bool,
    pub health_fallback: HealthFallback,
}

/// The router behind the duplicated-prefix rewrite.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Build the full application. The path rewrite has to sit outside the
/// router so it runs before route matching.
pub fn build_app(state: Arc<AppState>, options: RouterOptions) -> App {
    MapRequest::new(
        build_router(state, options),
        normalize_request as fn(Request) -> Request,
    )
}

/// Build the axum router.
pub fn build_router(state: Arc<AppState>, options: RouterOptions) -> Router {
    let health = match options.health_fallback {
        HealthFallback::NotFound => get(handlers::health).fallback(handlers::not_found),
        HealthFallback::MethodNotAllowed => get(handlers::health),
    };

    let mut router = Router::new()
        .route(HEALTH_PATH, health)
        .route(
            MODELS_PATH,
            get(handlers::models).fallback(handlers::not_found),
        )
        .route(CHAT_PATH, any(handlers::chat_completions))
        .route(LEGACY_CHAT_PATH, any(handlers::chat_completions));

    if options.root_alias_chat {
        router = router.route(ROOT_PATH, any(handlers::chat_completions));
    }

    // Fallback first so the layers below cover it too.
    let router = router.fallback(handlers::not_found);

    let router = if options.cors {
        router.layer(axum_middleware::from_fn(middleware::cors_middleware))
    } else {
        router
    };

    router
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}

/// Rewrite `/v1/v1/...` to `/v1/...`, keeping the query string.
fn normalize_request(mut req: Request) -> Request {
    let Some(path) = strip_duplicate_prefix(req.uri().path(), API_PREFIX).map(str::to_owned)
    else {
        return req;
    };

    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let original = req.uri().path().to_string();
    let mut parts = req.uri().clone().into_parts();
    let Ok(path_and_query) = path_and_query.parse() else {
        return req;
    };
    parts.path_and_query = Some(path_and_query);
    if let Ok(uri) = Uri::from_parts(parts) {
        *req.uri_mut() = uri;
        req.extensions_mut().insert(RewrittenFrom(original));
    }
    req
}

/// Remove exactly one redundant copy of `prefix` from the front of `path`.
pub fn strip_duplicate_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let after = rest.strip_prefix(prefix)?;
    if after.is_empty() || after.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
