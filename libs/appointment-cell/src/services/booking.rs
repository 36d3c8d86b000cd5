use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::store::{AppointmentStore, ProviderStore, StoreError, UserStore};
use shared_models::appointment::{Appointment, AppointmentStatus};

use crate::models::{AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest};
use crate::services::conflict::ConflictGuard;

/// Owns the appointment state machine: create, reschedule, cancel.
///
/// States are {scheduled, cancelled}; cancelled is terminal and retained.
/// Ownership checks happen in the handlers before any method here runs.
pub struct BookingService {
    users: Arc<dyn UserStore>,
    appointments: Arc<dyn AppointmentStore>,
    conflict: ConflictGuard,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserStore>,
        providers: Arc<dyn ProviderStore>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Self {
        let conflict = ConflictGuard::new(providers, appointments.clone());
        Self {
            users,
            appointments,
            conflict,
        }
    }

    /// Book a slot for a patient. The target must be an existing, verified
    /// doctor account; the final claim on the slot is the store's atomic
    /// insert, so a lost race surfaces as `SlotTaken` even after the guard
    /// passed.
    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let provider = self
            .users
            .find_user(request.provider_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::ProviderNotFound)?;

        if !provider.is_verified_provider() {
            return Err(AppointmentError::ProviderNotBookable);
        }

        self.conflict
            .reserve(request.provider_id, request.date, &request.slot, None)
            .await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            provider_id: request.provider_id,
            date: request.date,
            slot: request.slot,
            reason: request.reason,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let appointment = self
            .appointments
            .insert_scheduled(appointment)
            .await
            .map_err(|e| match e {
                StoreError::SlotTaken => AppointmentError::SlotTaken,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        info!(
            "appointment {} booked: provider {} on {} at {}",
            appointment.id, appointment.provider_id, appointment.date, appointment.slot
        );
        Ok(appointment)
    }

    /// Move a scheduled appointment to a new (date, slot). A conflict
    /// leaves the appointment exactly where it was.
    pub async fn reschedule(
        &self,
        appointment: &Appointment,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::AlreadyCancelled);
        }

        self.conflict
            .reserve(
                appointment.provider_id,
                request.date,
                &request.slot,
                Some(appointment.id),
            )
            .await?;

        let updated = self
            .appointments
            .reschedule(appointment.id, request.date, &request.slot, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::SlotTaken => AppointmentError::SlotTaken,
                StoreError::NotFound => AppointmentError::NotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        info!(
            "appointment {} rescheduled to {} at {}",
            updated.id, updated.date, updated.slot
        );
        Ok(updated)
    }

    /// Cancel an appointment. Cancelling one that is already cancelled is a
    /// no-op success, which keeps client retries and double-clicks safe.
    pub async fn cancel(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        if appointment.status == AppointmentStatus::Cancelled {
            debug!("appointment {} already cancelled", appointment.id);
            return Ok(appointment.clone());
        }

        let cancelled = self
            .appointments
            .set_status(appointment.id, AppointmentStatus::Cancelled, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AppointmentError::NotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        info!("appointment {} cancelled", cancelled.id);
        Ok(cancelled)
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .find_appointment(id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.appointments
            .list_for_patient(patient_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn list_for_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.appointments
            .list_for_provider(provider_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}
