use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::state::AppState;
use shared_models::appointment::Appointment;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest};
use crate::services::booking::BookingService;

fn booking_service(state: &AppState) -> BookingService {
    BookingService::new(
        state.users.clone(),
        state.providers.clone(),
        state.appointments.clone(),
    )
}

fn into_app_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("appointment not found".to_string()),
        AppointmentError::ProviderNotFound => AppError::NotFound("provider not found".to_string()),
        AppointmentError::ProviderNotBookable => {
            AppError::BadRequest("provider is not accepting appointments".to_string())
        }
        AppointmentError::InvalidSlot(slot) => {
            AppError::BadRequest(format!("unknown slot label: {}", slot))
        }
        AppointmentError::NotWorkingDay(day) => {
            AppError::BadRequest(format!("provider does not work on {}", day))
        }
        AppointmentError::SlotTaken => {
            AppError::Conflict("appointment slot is no longer available".to_string())
        }
        AppointmentError::AlreadyCancelled => {
            AppError::BadRequest("cancelled appointments cannot be rescheduled".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Load an appointment for a participant. Outsiders get the same NotFound
/// as a genuinely missing id so that appointment ids cannot be probed.
async fn load_for_participant(
    service: &BookingService,
    appointment_id: Uuid,
    user: &User,
) -> Result<Appointment, AppError> {
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(into_app_error)?;

    if !appointment.involves(user.id) && !user.is_admin() {
        return Err(AppError::NotFound("appointment not found".to_string()));
    }
    Ok(appointment)
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.provider_id == user.id {
        return Err(AppError::ValidationError(
            "cannot book an appointment with yourself".to_string(),
        ));
    }

    let service = booking_service(&state);
    let appointment = service
        .book(user.id, request)
        .await
        .map_err(into_app_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

/// Patients see their own bookings; providers see their schedule.
#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = booking_service(&state);

    let appointments = match user.role {
        Role::Doctor => service.list_for_provider(user.id).await,
        _ => service.list_for_patient(user.id).await,
    }
    .map_err(into_app_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = booking_service(&state);
    let appointment = load_for_participant(&service, appointment_id, &user).await?;

    Ok(Json(json!(appointment)))
}

/// Rescheduling is a patient-side action; the assigned provider can see the
/// appointment but cannot move it.
#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = booking_service(&state);
    let appointment = load_for_participant(&service, appointment_id, &user).await?;

    if appointment.patient_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "only the booking patient may reschedule".to_string(),
        ));
    }

    let updated = service
        .reschedule(&appointment, request)
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": updated,
        "message": "Appointment rescheduled successfully"
    })))
}

/// Idempotent: cancelling an already-cancelled appointment reports success.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = booking_service(&state);
    let appointment = load_for_participant(&service, appointment_id, &user).await?;

    let cancelled = service
        .cancel(&appointment)
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": cancelled,
        "message": "Appointment cancelled"
    })))
}
