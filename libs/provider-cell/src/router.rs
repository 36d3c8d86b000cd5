use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn provider_routes(state: Arc<AppState>) -> Router {
    // The whole surface sits behind authentication; role checks happen in
    // the handlers against the resolved user.
    let protected_routes = Router::new()
        .route("/", get(handlers::list_providers))
        .route("/me/schedule", put(handlers::update_my_schedule))
        .route("/{provider_id}/availability", get(handlers::get_availability))
        .route("/{provider_id}/verify", post(handlers::verify_provider))
        .route("/{provider_id}/reject", post(handlers::reject_provider))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
