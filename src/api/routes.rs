use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_context, request_context_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/suggestions", get(handlers::get_suggestions))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_context))
        .layer(from_fn(request_context_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
