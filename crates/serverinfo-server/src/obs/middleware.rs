//! Axum middleware wrapping every request in a [`RequestGuard`].
//!
//! Requests are labelled by the matched route template, not the raw URI, so
//! `/api/info?x=1` and `/api/info` share one series. Requests that match no
//! route share the `unmatched` label, and non-standard methods share `OTHER`,
//! so client input cannot grow the registry.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

pub const UNMATCHED_PATH: &str = "unmatched";
pub const OTHER_METHOD: &str = "OTHER";

/// Label value for a request method: standard methods as-is, anything else `OTHER`.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "CONNECT" => "CONNECT",
        "OPTIONS" => "OPTIONS",
        "TRACE" => "TRACE",
        "PATCH" => "PATCH",
        _ => OTHER_METHOD,
    }
}

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = method_label(req.method());
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "-".to_owned());

    tracing::info!(method = %req.method(), path = %req.uri().path(), %ip, "request received");

    let guard = state.interceptor().guard(method, &route);
    let response = next.run(req).await;
    guard.finish(response.status().as_u16());
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_methods_keep_their_name() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::PATCH), "PATCH");
        assert_eq!(method_label(&Method::OPTIONS), "OPTIONS");
    }

    #[test]
    fn extension_methods_collapse_to_other() {
        assert_eq!(method_label(&Method::from_bytes(b"PURGE").unwrap()), OTHER_METHOD);
        assert_eq!(method_label(&Method::from_bytes(b"get").unwrap()), OTHER_METHOD);
    }
}
