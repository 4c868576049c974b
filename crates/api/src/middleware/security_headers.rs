//! Security headers middleware.
//!
//! Adds security-related HTTP headers to all responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Environment variable that turns on `Strict-Transport-Security`.
pub const HSTS_ENV_VAR: &str = "SURVEY__SECURITY__HSTS_ENABLED";

/// Middleware that adds security headers to all responses.
///
/// Headers added:
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer` so share tokens do not leak to third parties
/// - `Strict-Transport-Security` when [`HSTS_ENV_VAR`] is `true`
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );

    if hsts_enabled(std::env::var(HSTS_ENV_VAR).ok().as_deref()) {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

fn hsts_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_enabled_parsing() {
        assert!(hsts_enabled(Some("true")));
        assert!(hsts_enabled(Some("TRUE")));
        assert!(!hsts_enabled(Some("false")));
        assert!(!hsts_enabled(Some("1")));
        assert!(!hsts_enabled(None));
    }
}
