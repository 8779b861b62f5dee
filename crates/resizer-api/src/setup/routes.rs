//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Invocation records are tiny; anything larger is not a resize request.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/resize", post(handlers::resize::resize_image))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
