use std::sync::Arc;

use axum::{
    body::Body, extract::State, http::Request, middleware::Next, response::Response,
};

use shared_database::state::AppState;
use shared_models::error::AppError;

use crate::edge::extract_token;
use crate::identity;
use crate::jwt;

/// Middleware for authenticated API routes.
///
/// Verifies the token, then resolves the subject into the live user record
/// and stores it in request extensions for handlers to pick up via
/// `Extension<User>`. This is the stateful counterpart to the edge filter.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)
        .ok_or_else(|| AppError::Auth("missing bearer token".to_string()))?;

    let claims = jwt::verify(&token, &state.config.jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    let user = identity::resolve(&claims, state.users.as_ref()).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
