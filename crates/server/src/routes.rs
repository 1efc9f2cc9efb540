//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// # Panics
///
/// Panics if `cors_allowed_origin` is not a valid header value.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/books",
            post(handlers::upload_book).get(handlers::list_books),
        )
        .route("/books/{id}/stream", get(handlers::stream_book))
        .route("/books/{id}", delete(handlers::delete_book))
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(
            state.config.server.max_upload_bytes as usize,
        ));

    if let Some(origin) = &state.config.server.cors_allowed_origin {
        router = router.layer(cors_layer(origin));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origin == "*" {
        layer.allow_origin(Any)
    } else {
        let origin = origin
            .parse::<HeaderValue>()
            .expect("invalid cors_allowed_origin");
        layer.allow_origin(origin)
    }
}
