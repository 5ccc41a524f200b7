//! Response relay and error mapping.
//!
//! # Responsibilities
//! - Relay the backend response status, headers and streaming body
//! - Strip hop-by-hop headers from the relayed response
//! - Map forwarding failures to 502 / 504

use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use thiserror::Error;

use crate::http::headers::strip_hop_by_hop;

/// Per-request forwarding failure. Never retried.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "Gateway timeout").into_response(),
            ForwardError::Request(_) | ForwardError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "Bad gateway").into_response()
            }
        }
    }
}

/// Response sent when no backend is healthy.
pub fn service_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
}

/// Convert the backend response into the client response.
pub fn relay(response: axum::http::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
