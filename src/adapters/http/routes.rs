//! HTTP routes for the conversation API.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat, delete_session, get_session, health, reload_catalog, AppState,
};

/// Creates the API router with all endpoints.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/catalog/reload", post(reload_catalog))
        .route("/health", get(health))
        .with_state(state)
}

/// The full application: routes plus the shared middleware stack.
///
/// CORS is permissive (the original service fronted a browser client on
/// arbitrary origins); the timeout bounds a whole request including its
/// upstream calls.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
}
