use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::state::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::provider::VerificationStatus;
use shared_utils::identity::{require_admin, require_verified_provider};

use crate::models::{AvailabilityQuery, ProviderSummary, UpdateScheduleRequest};
use crate::services::availability::{AvailabilityService, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::services::verification::VerificationService;

/// Verified providers only; pending and rejected profiles are not listed.
#[axum::debug_handler]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let profiles = state
        .providers
        .list_profiles(VerificationStatus::Approved)
        .await
        .map_err(AppError::from)?;

    let mut providers = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let user = state
            .users
            .find_user(profile.provider_id)
            .await
            .map_err(AppError::from)?;
        if let Some(user) = user {
            providers.push(ProviderSummary {
                id: profile.provider_id,
                name: user.name,
                specialty: profile.specialty,
                working_days: profile.working_days,
            });
        }
    }

    Ok(Json(json!({ "providers": providers })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days > MAX_WINDOW_DAYS {
        return Err(AppError::BadRequest(format!(
            "window must be at most {} days",
            MAX_WINDOW_DAYS
        )));
    }

    let service = AvailabilityService::new(state.providers.clone(), state.appointments.clone());
    let available = service.available_slots(provider_id, from, days).await?;

    Ok(Json(json!({
        "provider_id": provider_id,
        "from": from,
        "days": days,
        "available": available
    })))
}

/// Providers manage their own weekly pattern; gated on live verification
/// state, not on token claims.
#[axum::debug_handler]
pub async fn update_my_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    require_verified_provider(&user)?;

    let service = VerificationService::new(state.users.clone(), state.providers.clone());
    let profile = service.set_schedule(user.id, request.working_days).await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

#[axum::debug_handler]
pub async fn verify_provider(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = VerificationService::new(state.users.clone(), state.providers.clone());
    let profile = service.verify(provider_id).await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

#[axum::debug_handler]
pub async fn reject_provider(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = VerificationService::new(state.users.clone(), state.providers.clone());
    let profile = service.reject(provider_id).await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}
