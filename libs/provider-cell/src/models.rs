use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from: Option<NaiveDate>,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub working_days: Vec<String>,
}

/// Patient-facing listing entry: profile joined with the account name.
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
    pub working_days: Vec<String>,
}
