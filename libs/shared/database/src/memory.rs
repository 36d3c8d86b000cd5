use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::User;
use shared_models::provider::{ProviderProfile, VerificationStatus};

use crate::store::{AppointmentStore, ProviderStore, StoreError, UserStore};

/// In-process store used when no database is configured and by the test
/// suites. Each map sits behind its own mutex; appointment writes take the
/// appointment lock for the whole check-and-write, which is what makes
/// `insert_scheduled` and `reschedule` atomic here.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    profiles: Mutex<HashMap<Uuid, ProviderProfile>>,
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slot_held(
    appointments: &HashMap<Uuid, Appointment>,
    provider_id: Uuid,
    date: NaiveDate,
    slot: &str,
    exclude: Option<Uuid>,
) -> bool {
    appointments.values().any(|a| {
        a.is_active()
            && a.provider_id == provider_id
            && a.date == date
            && a.slot == slot
            && Some(a.id) != exclude
    })
}

fn by_date_then_slot(appointments: &mut Vec<Appointment>) {
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.slot.cmp(&b.slot)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!(
                "email {} is already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("user store lock poisoned");
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("user store lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> Result<User, StoreError> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.verified = verified;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn insert_profile(&self, profile: ProviderProfile) -> Result<ProviderProfile, StoreError> {
        let mut profiles = self.profiles.lock().expect("profile store lock poisoned");
        profiles.insert(profile.provider_id, profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, provider_id: Uuid) -> Result<Option<ProviderProfile>, StoreError> {
        let profiles = self.profiles.lock().expect("profile store lock poisoned");
        Ok(profiles.get(&provider_id).cloned())
    }

    async fn list_profiles(
        &self,
        verification: VerificationStatus,
    ) -> Result<Vec<ProviderProfile>, StoreError> {
        let profiles = self.profiles.lock().expect("profile store lock poisoned");
        let mut matching: Vec<ProviderProfile> = profiles
            .values()
            .filter(|p| p.verification == verification)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.provider_id);
        Ok(matching)
    }

    async fn set_verification(
        &self,
        provider_id: Uuid,
        status: VerificationStatus,
    ) -> Result<ProviderProfile, StoreError> {
        let mut profiles = self.profiles.lock().expect("profile store lock poisoned");
        let profile = profiles.get_mut(&provider_id).ok_or(StoreError::NotFound)?;
        profile.verification = status;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_working_days(
        &self,
        provider_id: Uuid,
        working_days: Vec<String>,
    ) -> Result<ProviderProfile, StoreError> {
        let mut profiles = self.profiles.lock().expect("profile store lock poisoned");
        let profile = profiles.get_mut(&provider_id).ok_or(StoreError::NotFound)?;
        profile.working_days = working_days;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert_scheduled(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        if slot_held(
            &appointments,
            appointment.provider_id,
            appointment.date,
            &appointment.slot,
            None,
        ) {
            return Err(StoreError::SlotTaken);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        Ok(appointments.get(&id).cloned())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        let mut matching: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        by_date_then_slot(&mut matching);
        Ok(matching)
    }

    async fn list_for_provider(&self, provider_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        let mut matching: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.provider_id == provider_id)
            .cloned()
            .collect();
        by_date_then_slot(&mut matching);
        Ok(matching)
    }

    async fn list_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        let mut matching: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                a.is_active() && a.provider_id == provider_id && a.date >= from && a.date < to
            })
            .cloned()
            .collect();
        by_date_then_slot(&mut matching);
        Ok(matching)
    }

    async fn find_active_at(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, StoreError> {
        let appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        Ok(appointments
            .values()
            .find(|a| {
                a.is_active()
                    && a.provider_id == provider_id
                    && a.date == date
                    && a.slot == slot
                    && Some(a.id) != exclude
            })
            .cloned())
    }

    async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        slot: &str,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        let provider_id = appointments
            .get(&id)
            .ok_or(StoreError::NotFound)?
            .provider_id;
        if slot_held(&appointments, provider_id, date, slot, Some(id)) {
            return Err(StoreError::SlotTaken);
        }
        let appointment = appointments.get_mut(&id).ok_or(StoreError::NotFound)?;
        appointment.date = date;
        appointment.slot = slot.to_string();
        appointment.updated_at = now;
        Ok(appointment.clone())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self
            .appointments
            .lock()
            .expect("appointment store lock poisoned");
        let appointment = appointments.get_mut(&id).ok_or(StoreError::NotFound)?;
        appointment.status = status;
        appointment.updated_at = now;
        Ok(appointment.clone())
    }
}
