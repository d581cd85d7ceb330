//! Security headers middleware

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// CSP for server-rendered pages. The map page loads Leaflet from unpkg and
/// tiles from OpenStreetMap.
const PAGE_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://unpkg.com; \
     style-src 'self' 'unsafe-inline' https://unpkg.com; \
     img-src 'self' data: https://*.tile.openstreetmap.org https://unpkg.com; \
     connect-src 'self'; form-action 'self'; frame-ancestors 'self'";

/// Paths that return JSON rather than HTML.
fn is_api_path(path: &str) -> bool {
    path == "/health" || path == "/api" || path.starts_with("/api/")
}

/// Adds baseline security headers to every response: a locked-down CSP on
/// the JSON API, a CSP that admits the page assets on HTML views.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let is_https = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
        || req
            .uri()
            .scheme_str()
            .map(|s| s.eq_ignore_ascii_case("https"))
            .unwrap_or(false);

    let is_page = !is_api_path(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("same-origin"),
    );

    if is_page {
        headers.insert("content-security-policy", HeaderValue::from_static(PAGE_CSP));
        headers.insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));
    } else {
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        headers.insert(
            "content-security-policy",
            HeaderValue::from_static("default-src 'none'"),
        );
    }

    headers.insert(
        "cross-origin-opener-policy",
        HeaderValue::from_static("same-origin"),
    );

    if is_https {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
