use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_database::store::{AppointmentStore, ProviderStore};
use shared_models::error::AppError;
use shared_models::provider::SLOT_GRID;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 60;

pub struct AvailabilityService {
    providers: Arc<dyn ProviderStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(
        providers: Arc<dyn ProviderStore>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Self {
        Self {
            providers,
            appointments,
        }
    }

    /// Compute the open slots for each day in `[from, from + window_days)`.
    ///
    /// Working days are seeded with the full grid in canonical order and
    /// stay in the output even when fully booked (empty list); days outside
    /// the weekly pattern are absent entirely. Slots already elapsed on the
    /// current day are intentionally not filtered out.
    ///
    /// Read-only: this never mutates anything and holds no cache.
    pub async fn available_slots(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        window_days: u32,
    ) -> Result<BTreeMap<NaiveDate, Vec<String>>, AppError> {
        let profile = self
            .providers
            .find_profile(provider_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("provider not found".to_string()))?;

        // Unapproved providers are invisible to the booking surface.
        if !profile.is_approved() {
            return Err(AppError::NotFound("provider not found".to_string()));
        }

        let mut open: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for offset in 0..window_days {
            let date = from + Duration::days(offset as i64);
            if profile.works_on(date.weekday()) {
                open.insert(date, SLOT_GRID.iter().map(|s| s.to_string()).collect());
            }
        }

        if open.is_empty() {
            return Ok(open);
        }

        let to = from + Duration::days(window_days as i64);
        let booked = self
            .appointments
            .list_active_for_provider_in_range(provider_id, from, to)
            .await
            .map_err(AppError::from)?;

        for appointment in booked {
            if let Some(slots) = open.get_mut(&appointment.date) {
                // Removing an absent label is a no-op, not an error.
                slots.retain(|slot| slot != &appointment.slot);
            }
        }

        debug!(
            "computed availability for provider {} over {} days",
            provider_id, window_days
        );
        Ok(open)
    }
}
