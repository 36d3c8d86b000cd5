use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::state::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::services::credentials::CredentialService;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = CredentialService::new(state.users.clone(), state.providers.clone());

    let role = request.role.unwrap_or(Role::Patient);
    let user = service
        .signup(&request.email, &request.name, &request.password, role)
        .await?;

    let token = jwt::issue(&user, &state.config.jwt_secret);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": user,
            "token": token
        })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("login attempt for {}", request.email);

    let service = CredentialService::new(state.users.clone(), state.providers.clone());
    let user = service.login(&request.email, &request.password).await?;

    let token = jwt::issue(&user, &state.config.jwt_secret);

    Ok(Json(json!({
        "success": true,
        "user": user,
        "token": token
    })))
}

/// Live identity for the calling session; the middleware has already
/// re-resolved the token subject against the store.
#[axum::debug_handler]
pub async fn me(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({ "user": user }))
}
