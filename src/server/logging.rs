use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn, Level};

use super::handlers::CacheOutcome;
use super::{RewrittenFrom, HEALTH_PATH};

/// Request logging. Health checks are skipped; the level follows the status class.
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if path == HEALTH_PATH {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let rewritten_from = req
        .extensions()
        .get::<RewrittenFrom>()
        .map(|original| original.0.clone());
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();
    let cache = response
        .extensions()
        .get::<CacheOutcome>()
        .map(|outcome| outcome.as_str());
    let rewritten_from = rewritten_from.as_deref();

    let level = level_for(status);
    if level == Level::ERROR {
        error!(method, path, rewritten_from, cache, status, duration_ms, "request");
    } else if level == Level::WARN {
        warn!(method, path, rewritten_from, cache, status, duration_ms, "request");
    } else {
        info!(method, path, rewritten_from, cache, status, duration_ms, "request");
    }

    response
}

fn level_for(status: u16) -> Level {
    match status {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}
