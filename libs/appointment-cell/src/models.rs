use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: NaiveDate,
    pub slot: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("appointment not found")]
    NotFound,

    #[error("provider not found")]
    ProviderNotFound,

    #[error("provider is not accepting appointments")]
    ProviderNotBookable,

    #[error("unknown slot label: {0}")]
    InvalidSlot(String),

    #[error("provider does not work on {0}")]
    NotWorkingDay(String),

    /// The (provider, date, slot) tuple is held by an active appointment.
    #[error("appointment slot is already booked")]
    SlotTaken,

    #[error("cancelled appointments cannot be rescheduled")]
    AlreadyCancelled,

    #[error("database error: {0}")]
    DatabaseError(String),
}
