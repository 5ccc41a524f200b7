//! Upstream request preparation.
//!
//! # Responsibilities
//! - Rewrite the URI to target the selected backend
//! - Rewrite `Host` to the backend authority
//! - Strip hop-by-hop headers (keeping `TE: trailers`), append `X-Forwarded-For`
//!
//! # Design Decisions
//! - Single-host rewrite: the inbound path and query replace any path on the
//!   backend's base URL rather than being appended to it
//! - The body is passed through untouched and never buffered

use std::net::IpAddr;

use axum::body::Body;
use axum::http::{header, uri, HeaderValue, Request, Uri, Version};

use crate::http::headers::{accepts_trailers, append_forwarded_for, strip_hop_by_hop};
use crate::http::response::ForwardError;
use crate::load_balancer::Backend;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Read the request ID assigned by the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the upstream URI: backend scheme and authority, inbound path and query.
pub fn upstream_uri(backend: &Backend, inbound: &Uri) -> Result<Uri, ForwardError> {
    let path_and_query = inbound
        .path_and_query()
        .map(uri::PathAndQuery::as_str)
        .unwrap_or("/");

    Uri::builder()
        .scheme(backend.address().scheme())
        .authority(backend.authority())
        .path_and_query(path_and_query)
        .build()
        .map_err(ForwardError::Request)
}

/// Turn an inbound request into the request sent to `backend`.
pub fn prepare(
    backend: &Backend,
    client: Option<IpAddr>,
    request: Request<Body>,
) -> Result<Request<Body>, ForwardError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream_uri(backend, &parts.uri)?;
    parts.version = Version::HTTP_11;

    let trailers = accepts_trailers(&parts.headers);
    strip_hop_by_hop(&mut parts.headers);
    if trailers {
        parts.headers.insert(header::TE, HeaderValue::from_static("trailers"));
    }

    let host = HeaderValue::from_str(&backend.authority())
        .map_err(|e| ForwardError::Request(e.into()))?;
    parts.headers.insert(header::HOST, host);

    if let Some(ip) = client {
        append_forwarded_for(&mut parts.headers, ip);
    }

    Ok(Request::from_parts(parts, body))
}
