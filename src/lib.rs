//! Draft gateway: per-client admission control in front of an upstream
//! text-generation model, with a fixed prompt profile per draft action.

pub mod config;
pub mod constants;
pub mod domain;
pub mod routes;
pub mod services;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_ORIGIN};
use services::dispatcher::DraftDispatcher;
use services::rate_limit::AdmissionControl;

pub struct AppState {
    pub admission: Arc<dyn AdmissionControl>,
    pub dispatcher: DraftDispatcher,
}

/// Assemble the router with body limit, CORS headers and request tracing.
pub fn build_app(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    routes::build_routes().layer(layers).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticCredential;
    use crate::services::dispatcher::tests::MockBackend;
    use crate::services::rate_limit::{FixedWindowLimiter, RateLimitConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health() {
        let state = Arc::new(AppState {
            admission: Arc::new(FixedWindowLimiter::new(RateLimitConfig::default())),
            dispatcher: DraftDispatcher::new(MockBackend::ok(), Arc::new(StaticCredential(None))),
        });
        let app = build_app(state, 1024);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = axum::body::to_bytes(response.into_body(), 16).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }
}
