//! PetShop Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`cart`] - Cart manager, persistence, view model and notifications
//! - [`catalog`] - Product cards shown on the home page
//! - [`navigation`] - The configured cart link
//! - [`routes`] - Axum handlers and askama templates
//! - [`config`] / [`state`] / [`error`] - Application plumbing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod navigation;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the storefront router.
///
/// Sentry layers are added by the binary so that tests can drive the router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::cart::MemoryStore;
    use crate::catalog::Catalog;
    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        let config = StorefrontConfig::from_lookup(|_| None).unwrap();
        app(AppState::new(config, MemoryStore::new(), Catalog::builtin()))
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "Not found: /nope");
    }
}
