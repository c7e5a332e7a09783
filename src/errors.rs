use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Errors surfaced to proxy clients.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Authorization header is missing")]
    MissingCredential,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Not Found")]
    NotFound,

    #[error("Failed to fetch model catalog from upstream")]
    UpstreamStatus(StatusCode),

    #[error("upstream unavailable")]
    UpstreamUnavailable,

    #[error("upstream timeout")]
    UpstreamTimeout,

    #[error("invalid upstream catalog: {0}")]
    InvalidCatalog(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamStatus(status) => *status,
            Self::UpstreamUnavailable | Self::InvalidCatalog(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a transport failure from the HTTP client.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::UpstreamTimeout
        } else {
            Self::UpstreamUnavailable
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::MethodNotAllowed | Self::NotFound | Self::UpstreamStatus(_) => {
                (status, self.to_string()).into_response()
            }
            // Detail stays in the logs.
            Self::InvalidCatalog(_) => json_error(status, "invalid upstream catalog"),
            Self::Internal(_) => json_error(status, "internal error"),
            _ => json_error(status, &self.to_string()),
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
