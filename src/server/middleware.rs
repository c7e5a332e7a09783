use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Authorization, Content-Type, Accept";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// The fixed permissive CORS header set.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
    headers
}

/// Return `response` carrying `extra` merged into its own headers.
/// Headers the response already has are kept as they are.
pub fn with_headers(mut response: Response, extra: &HeaderMap) -> Response {
    let headers = response.headers_mut();
    for (name, value) in extra {
        headers
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
    response
}

/// CORS middleware: answers any OPTIONS with 204, decorates everything else.
pub async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    let extra = cors_headers();
    if req.method() == Method::OPTIONS {
        return with_headers(StatusCode::NO_CONTENT.into_response(), &extra);
    }
    with_headers(next.run(req).await, &extra)
}
