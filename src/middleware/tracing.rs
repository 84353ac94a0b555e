//! Request tracing middleware

use axum::{
    extract::Request,
    http::{header::USER_AGENT, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// First hop of `x-forwarded-for`, else `x-real-ip`
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Log one line per request with status and latency
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = client_ip(request.headers());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        tracing::error!(
            %method, %path, status, latency_ms, ?client_ip, ?user_agent,
            "HTTP request failed"
        );
    } else if response.status().is_client_error() {
        tracing::warn!(
            %method, %path, status, latency_ms, ?client_ip, ?user_agent,
            "HTTP request rejected"
        );
    } else {
        tracing::info!(
            %method, %path, status, latency_ms, ?client_ip, ?user_agent,
            "HTTP request"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.2"));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_absent() {
        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
