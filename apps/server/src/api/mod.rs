//! HTTP layer: handlers, route tables and middleware.

pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::state::AppState;
use axum::{
    http::{header::HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router with every route and middleware layer.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let body_limit = server.max_request_body_size;
    let cors = cors_layer(&server.cors_origins);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", routes::api::api_routes())
        .merge(routes::pages::page_routes())
        .layer(from_fn(middleware::security::security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(body_limit));

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

/// CORS is only enabled for explicitly configured origins.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_is_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["https://maps.example.org".to_string()]).is_some());
    }
}
