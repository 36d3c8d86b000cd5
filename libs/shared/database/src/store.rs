use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::provider::{ProviderProfile, VerificationStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    /// An active appointment already holds the (provider, date, slot) tuple.
    #[error("slot is already booked")]
    SlotTaken,

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotTaken => AppError::Conflict("slot is no longer available".to_string()),
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            StoreError::NotFound => AppError::NotFound("record not found".to_string()),
            StoreError::Backend(msg) => AppError::Database(msg),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is already registered.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn set_verified(&self, id: Uuid, verified: bool) -> Result<User, StoreError>;
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn insert_profile(&self, profile: ProviderProfile) -> Result<ProviderProfile, StoreError>;

    async fn find_profile(&self, provider_id: Uuid) -> Result<Option<ProviderProfile>, StoreError>;

    async fn list_profiles(
        &self,
        verification: VerificationStatus,
    ) -> Result<Vec<ProviderProfile>, StoreError>;

    async fn set_verification(
        &self,
        provider_id: Uuid,
        status: VerificationStatus,
    ) -> Result<ProviderProfile, StoreError>;

    async fn set_working_days(
        &self,
        provider_id: Uuid,
        working_days: Vec<String>,
    ) -> Result<ProviderProfile, StoreError>;
}

/// Appointment persistence.
///
/// `insert_scheduled` and `reschedule` are the only paths that can claim a
/// slot, and both are atomic: the free-slot check and the write happen as
/// one operation against the backing store. Callers must treat `SlotTaken`
/// from either as an ordinary booking conflict, not a bug.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert_scheduled(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Ordered by date, then slot label.
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    /// Ordered by date, then slot label.
    async fn list_for_provider(&self, provider_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    /// Non-cancelled appointments with `from <= date < to`.
    async fn list_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn find_active_at(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Atomic conditional move to a new (date, slot); `SlotTaken` when the
    /// target is held by another active appointment.
    async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        slot: &str,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError>;
}
