use std::str::FromStr;
use std::sync::Arc;

use chrono::Weekday;
use tracing::info;
use uuid::Uuid;

use shared_database::store::{ProviderStore, UserStore};
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_models::provider::{ProviderProfile, VerificationStatus};

pub struct VerificationService {
    users: Arc<dyn UserStore>,
    providers: Arc<dyn ProviderStore>,
}

impl VerificationService {
    pub fn new(users: Arc<dyn UserStore>, providers: Arc<dyn ProviderStore>) -> Self {
        Self { users, providers }
    }

    /// Approve a provider account. Flips the account's `verified` flag and
    /// records the decision on the profile.
    pub async fn verify(&self, provider_id: Uuid) -> Result<ProviderProfile, AppError> {
        self.require_doctor_account(provider_id).await?;

        let profile = self
            .providers
            .set_verification(provider_id, VerificationStatus::Approved)
            .await
            .map_err(AppError::from)?;
        self.users
            .set_verified(provider_id, true)
            .await
            .map_err(AppError::from)?;

        info!("provider {} verified", provider_id);
        Ok(profile)
    }

    /// Record a rejection. The account keeps `verified == false`.
    pub async fn reject(&self, provider_id: Uuid) -> Result<ProviderProfile, AppError> {
        self.require_doctor_account(provider_id).await?;

        let profile = self
            .providers
            .set_verification(provider_id, VerificationStatus::Rejected)
            .await
            .map_err(AppError::from)?;
        self.users
            .set_verified(provider_id, false)
            .await
            .map_err(AppError::from)?;

        info!("provider {} rejected", provider_id);
        Ok(profile)
    }

    /// Replace the weekly working-day pattern. Day names must parse as
    /// weekdays; duplicates collapse, first occurrence wins.
    pub async fn set_schedule(
        &self,
        provider_id: Uuid,
        working_days: Vec<String>,
    ) -> Result<ProviderProfile, AppError> {
        let mut seen: Vec<Weekday> = Vec::new();
        let mut normalized: Vec<String> = Vec::new();

        for name in &working_days {
            let day = Weekday::from_str(name).map_err(|_| {
                AppError::ValidationError(format!("unknown weekday name: {}", name))
            })?;
            if !seen.contains(&day) {
                seen.push(day);
                normalized.push(name.trim().to_lowercase());
            }
        }

        self.providers
            .set_working_days(provider_id, normalized)
            .await
            .map_err(AppError::from)
    }

    async fn require_doctor_account(&self, provider_id: Uuid) -> Result<(), AppError> {
        let user = self
            .users
            .find_user(provider_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("provider not found".to_string()))?;

        if user.role != Role::Doctor {
            return Err(AppError::BadRequest(
                "account is not a provider".to_string(),
            ));
        }
        Ok(())
    }
}
