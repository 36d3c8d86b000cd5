use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed daily slot grid, in canonical display order. Availability
/// responses and conflict checks both key off these labels; order matters
/// for stable client display.
pub const SLOT_GRID: [&str; 7] = [
    "09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00",
];

pub fn is_grid_slot(label: &str) -> bool {
    SLOT_GRID.contains(&label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::Approved => write!(f, "approved"),
            VerificationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Scheduling profile attached to every doctor account.
///
/// `working_days` holds weekday names ("monday", "tue", ...); the weekly
/// pattern does not vary by date and there is no per-date override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub provider_id: Uuid,
    pub specialty: Option<String>,
    pub working_days: Vec<String>,
    pub verification: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderProfile {
    pub fn works_on(&self, day: Weekday) -> bool {
        self.working_days
            .iter()
            .any(|name| Weekday::from_str(name).map(|w| w == day).unwrap_or(false))
    }

    pub fn is_approved(&self) -> bool {
        self.verification == VerificationStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(days: &[&str]) -> ProviderProfile {
        ProviderProfile {
            provider_id: Uuid::new_v4(),
            specialty: None,
            working_days: days.iter().map(|d| d.to_string()).collect(),
            verification: VerificationStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn works_on_accepts_full_and_short_weekday_names() {
        let p = profile(&["monday", "wed"]);
        assert!(p.works_on(Weekday::Mon));
        assert!(p.works_on(Weekday::Wed));
        assert!(!p.works_on(Weekday::Tue));
    }

    #[test]
    fn unknown_day_names_never_match() {
        let p = profile(&["someday"]);
        assert!(!p.works_on(Weekday::Mon));
    }

    #[test]
    fn grid_slots_are_recognised() {
        assert!(is_grid_slot("09:00"));
        assert!(!is_grid_slot("09:30"));
    }
}
