//! HTTP middleware components.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Request ID header name.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Request timing header name.
pub const REQUEST_TIMING_HEADER: &str = "X-Response-Time";

/// Quota header: requests allowed per window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "RateLimit-Limit";

/// Quota header: requests left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "RateLimit-Remaining";

/// Quota header: seconds until the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "RateLimit-Reset";

/// Request ID type.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Request ID middleware - adds unique ID to each request.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    // Reuse the caller's ID only if it can be echoed back as a header value.
    let incoming = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .and_then(|v| HeaderValue::from_str(v).ok().map(|h| (v.to_string(), h)));

    let (request_id, header_value) = match incoming {
        Some(pair) => pair,
        None => {
            let id = Uuid::new_v4().to_string();
            let value = HeaderValue::from_str(&id).unwrap_or(HeaderValue::from_static("unknown"));
            (id, value)
        }
    };

    request.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    response
}

/// Timing middleware - tracks request duration.
pub async fn timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    if let Ok(value) = HeaderValue::from_str(&format!("{duration_ms:.2}ms")) {
        response.headers_mut().insert(REQUEST_TIMING_HEADER, value);
    }

    let status = response.status();
    if status.is_success() {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            request_id = %request_id,
            duration_ms = %format!("{:.2}", duration_ms),
            "Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            request_id = %request_id,
            duration_ms = %format!("{:.2}", duration_ms),
            "Client error"
        );
    } else {
        error!(
            method = %method,
            uri = %uri,
            status = %status,
            request_id = %request_id,
            duration_ms = %format!("{:.2}", duration_ms),
            "Server error"
        );
    }

    response
}

/// Rate limiting middleware.
///
/// Counts requests per client in fixed windows. Admitted responses carry
/// `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`; rejected
/// ones are a 429 with `Retry-After`.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let path = request.uri().path();
    if state
        .config
        .rate_limit
        .exempt_paths
        .iter()
        .any(|p| is_exempt(path, p))
    {
        return next.run(request).await;
    }

    let key = rate_limit_key(&request, state.config.rate_limit.trust_proxy);

    match state.check_rate_limit(&key).await {
        Ok(status) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(status.limit));
            headers.insert(
                RATE_LIMIT_REMAINING_HEADER,
                HeaderValue::from(status.remaining),
            );
            headers.insert(
                RATE_LIMIT_RESET_HEADER,
                HeaderValue::from(status.reset_after.as_secs()),
            );
            response
        }
        Err(err) => {
            let limit = state.config.rate_limit.max_requests;
            let mut response = err.into_response();
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(limit));
            headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(0u32));
            response
        }
    }
}

/// Whether `path` is `exempt` itself or lies below it.
fn is_exempt(path: &str, exempt: &str) -> bool {
    match path.strip_prefix(exempt) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || exempt.ends_with('/'),
        None => false,
    }
}

/// Get rate limit key from request.
fn rate_limit_key(request: &Request, trust_proxy: bool) -> String {
    // When trust_proxy is enabled, check proxy headers for real client IP
    if trust_proxy {
        if let Some(ip) = request
            .headers()
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
        {
            return format!("ip:{}", ip.trim());
        }

        // X-Forwarded-For may list several hops; the client is the first
        if let Some(forwarded) = request.headers().get("X-Forwarded-For") {
            if let Ok(s) = forwarded.to_str() {
                if let Some(ip) = s.split(',').next() {
                    return format!("ip:{}", ip.trim());
                }
            }
        }
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", addr.ip());
    }

    "ip:unknown".to_string()
}

/// Timeout middleware.
pub async fn timeout_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let timeout_duration = state.config.request_timeout_duration();

    match timeout(timeout_duration, next.run(request)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            error!("Request timed out after {:?}", timeout_duration);
            Err(AppError::Timeout)
        }
    }
}

/// Security headers middleware.
///
/// Mirrors the defaults of the usual `helmet` setup for a JSON API.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    // Names must stay lowercase for `HeaderName::from_static`.
    const HEADERS: &[(&str, &str)] = &[
        ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
        ("cross-origin-opener-policy", "same-origin"),
        ("cross-origin-resource-policy", "cross-origin"),
        ("referrer-policy", "no-referrer"),
        ("strict-transport-security", "max-age=15552000; includeSubDomains"),
        ("x-content-type-options", "nosniff"),
        ("x-dns-prefetch-control", "off"),
        ("x-download-options", "noopen"),
        ("x-frame-options", "SAMEORIGIN"),
        ("x-permitted-cross-domain-policies", "none"),
        ("x-xss-protection", "0"),
    ];

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.remove("x-powered-by");

    response
}

/// CORS configuration.
///
/// An empty origin list is fully permissive. A non-empty list restricts
/// origins to the read-only methods the API serves and allows credentials.
pub fn cors_layer(origins: &[String]) -> tower_http::cors::CorsLayer {
    use tower_http::cors::CorsLayer;

    // Let browsers cache preflight responses for a day
    let max_age = std::time::Duration::from_secs(86400);

    if origins.is_empty() {
        CorsLayer::permissive().max_age(max_age)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(max_age)
    }
}

/// Compression configuration.
pub fn compression_layer() -> tower_http::compression::CompressionLayer {
    tower_http::compression::CompressionLayer::new()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/gen-palette/3498db");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_key_ignores_proxy_headers_by_default() {
        let req = request(&[("X-Forwarded-For", "203.0.113.7")]);
        assert_eq!(rate_limit_key(&req, false), "ip:unknown");
    }

    #[test]
    fn test_key_uses_first_forwarded_hop() {
        let req = request(&[("X-Forwarded-For", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(rate_limit_key(&req, true), "ip:203.0.113.7");
    }

    #[test]
    fn test_key_prefers_real_ip() {
        let req = request(&[
            ("X-Real-IP", "198.51.100.2"),
            ("X-Forwarded-For", "203.0.113.7"),
        ]);
        assert_eq!(rate_limit_key(&req, true), "ip:198.51.100.2");
    }

    #[test]
    fn test_exempt_paths_match_on_segment_boundary() {
        assert!(is_exempt("/api/health", "/api/health"));
        assert!(is_exempt("/api/health/live", "/api/health"));
        assert!(!is_exempt("/api/healthz", "/api/health"));
        assert!(!is_exempt("/api/health-check", "/api/health"));
        assert!(!is_exempt("/gen-palette/3498db", "/api/health"));
        assert!(is_exempt("/static/app.js", "/static/"));
    }

    #[test]
    fn test_key_ignores_malformed_real_ip() {
        let mut req = request(&[("X-Forwarded-For", "203.0.113.7")]);
        req.headers_mut().insert(
            "X-Real-IP",
            HeaderValue::from_bytes(b"\xff\xfe").unwrap(),
        );
        assert_eq!(rate_limit_key(&req, true), "ip:203.0.113.7");
    }

    #[test]
    fn test_key_falls_back_to_peer_address() {
        let mut req = request(&[]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4321))));
        assert_eq!(rate_limit_key(&req, false), "ip:192.0.2.1");
    }
}
