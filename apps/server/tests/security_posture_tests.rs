#![allow(unused)]
#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use envirobase::config::Config;
use support::*;

#[tokio::test]
async fn api_responses_are_locked_down() -> anyhow::Result<()> {
    let app = offline_app()?;
    let (status, headers, _body) = app
        .request(Method::GET, "/api/v1/storage-tanks/not-a-number", None)
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "non-numeric tank id");

    for (name, expected) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "same-origin"),
        ("content-security-policy", "default-src 'none'"),
    ] {
        assert_eq!(
            header_str(&headers, name),
            expected,
            "missing/incorrect header '{name}'"
        );
    }

    // HSTS should not be set for plain HTTP requests.
    assert!(headers.get("strict-transport-security").is_none());
    Ok(())
}

#[tokio::test]
async fn pages_allow_map_assets() -> anyhow::Result<()> {
    let app = offline_app()?;
    let (status, headers, body) = app.request(Method::GET, "/map", None).await?;
    assert_status(status, StatusCode::OK, "map page");

    let csp = header_str(&headers, "content-security-policy");
    assert!(csp.contains("https://unpkg.com"), "csp: {csp}");
    assert!(csp.contains("tile.openstreetmap.org"), "csp: {csp}");
    assert_eq!(header_str(&headers, "x-frame-options"), "SAMEORIGIN");
    assert!(String::from_utf8_lossy(&body).contains("/api/v1/facilities/"));
    Ok(())
}

#[tokio::test]
async fn hsts_is_sent_behind_https_proxy() -> anyhow::Result<()> {
    let app = offline_app()?;
    let (_status, headers, _body) = app
        .request_with_extra_headers(
            Method::GET,
            "/map",
            None,
            &[("x-forwarded-proto", "https")],
        )
        .await?;
    assert!(header_str(&headers, "strict-transport-security").starts_with("max-age="));
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> anyhow::Result<()> {
    let app = offline_app()?;
    let (_status, headers, _body) = app.request(Method::GET, "/map", None).await?;
    assert!(!header_str(&headers, "x-request-id").is_empty());

    let (_status, headers, _body) = app
        .request_with_extra_headers(Method::GET, "/map", None, &[("x-request-id", "req-42")])
        .await?;
    assert_eq!(header_str(&headers, "x-request-id"), "req-42");
    Ok(())
}

#[tokio::test]
async fn cors_is_not_permissive_by_default() -> anyhow::Result<()> {
    let app = offline_app()?;
    let (_status, headers, _body) = app
        .request_with_extra_headers(
            Method::GET,
            "/map",
            None,
            &[("origin", "https://evil.example")],
        )
        .await?;
    assert!(
        headers.get("access-control-allow-origin").is_none(),
        "expected no permissive CORS by default"
    );
    Ok(())
}

#[tokio::test]
async fn cors_admits_configured_origins() -> anyhow::Result<()> {
    let mut config = Config::defaults();
    config.app.environment = "testing".to_string();
    config.server.cors_origins = vec!["https://maps.example.org".to_string()];
    let app = offline_app_with_config(config)?;

    let (_status, headers, _body) = app
        .request_with_extra_headers(
            Method::GET,
            "/map",
            None,
            &[("origin", "https://maps.example.org")],
        )
        .await?;
    assert_eq!(
        header_str(&headers, "access-control-allow-origin"),
        "https://maps.example.org"
    );
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
    let mut config = Config::defaults();
    config.app.environment = "testing".to_string();
    config.server.max_request_body_size = 64;
    let app = offline_app_with_config(config)?;

    let body = serde_json::json!({ "name": "x".repeat(256) });
    let length = serde_json::to_vec(&body)?.len().to_string();
    let (status, _headers, _body) = app
        .request_with_extra_headers(
            Method::POST,
            "/api/v1/facilities/",
            Some(body),
            &[("content-length", length.as_str())],
        )
        .await?;
    assert_status(status, StatusCode::PAYLOAD_TOO_LARGE, "oversized facility");
    Ok(())
}
