use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use provider_cell::router::provider_routes;
use shared_database::state::AppState;
use shared_utils::edge::edge_filter;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareBridge API is running!" }))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/providers", provider_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        // The edge filter wraps everything: cheap signature/expiry gate plus
        // baseline security headers on every response.
        .layer(middleware::from_fn_with_state(state, edge_filter))
}
