use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::store::{AppointmentStore, ProviderStore};
use shared_models::provider::is_grid_slot;

use crate::models::AppointmentError;

/// Pre-write validation of a reservation target.
///
/// This check produces friendly, typed failures (bad slot label, day off,
/// slot visibly taken) before any write is attempted. It is advisory: two
/// requests can both pass it for the same slot. The store's atomic
/// insert/reschedule is the authoritative enforcement of the
/// no-double-booking invariant, and callers must still handle `SlotTaken`
/// from the write itself.
pub struct ConflictGuard {
    providers: Arc<dyn ProviderStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl ConflictGuard {
    pub fn new(
        providers: Arc<dyn ProviderStore>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Self {
        Self {
            providers,
            appointments,
        }
    }

    /// `exclude` carries the appointment's own id during a reschedule so an
    /// in-place move does not collide with itself.
    pub async fn reserve(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        if !is_grid_slot(slot) {
            return Err(AppointmentError::InvalidSlot(slot.to_string()));
        }

        let profile = self
            .providers
            .find_profile(provider_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::ProviderNotFound)?;

        let weekday = date.weekday();
        if !profile.works_on(weekday) {
            return Err(AppointmentError::NotWorkingDay(weekday.to_string()));
        }

        let holder = self
            .appointments
            .find_active_at(provider_id, date, slot, exclude)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if let Some(existing) = holder {
            warn!(
                "slot {}/{} for provider {} already held by appointment {}",
                date, slot, provider_id, existing.id
            );
            return Err(AppointmentError::SlotTaken);
        }

        debug!("slot {}/{} for provider {} is free", date, slot, provider_id);
        Ok(())
    }
}
