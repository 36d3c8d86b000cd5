use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use async_trait::async_trait;
use shared_config::AppConfig;
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::User;
use shared_models::provider::{ProviderProfile, VerificationStatus};

use crate::store::{AppointmentStore, ProviderStore, StoreError, UserStore};

/// Thin client for a PostgREST-style document store API.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_url.clone(),
            api_key: config.database_api_key.clone(),
        }
    }

    fn headers(&self, representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).unwrap(),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        representation: bool,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());

            // A unique-constraint violation surfaces as 409; everything else
            // is a backend failure.
            if status == StatusCode::CONFLICT {
                debug!("store rejected write with conflict: {}", error_text);
                return Err(StoreError::Duplicate(error_text));
            }

            error!("store error ({}): {}", status, error_text);
            return Err(StoreError::Backend(format!(
                "store error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to parse store response: {}", e)))
    }
}

/// Store implementation backed by the document store's REST interface.
///
/// The no-double-booking invariant relies on a partial unique index over
/// (provider_id, date, slot) WHERE status <> 'cancelled' in the backing
/// schema; inserts and reschedule updates that collide with an active row
/// come back as 409 and are surfaced as `SlotTaken`.
pub struct PostgrestStore {
    client: PostgrestClient,
}

impl PostgrestStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: PostgrestClient::new(config),
        }
    }

    fn first_or_not_found<T>(mut rows: Vec<T>) -> Result<T, StoreError> {
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }
}

#[async_trait]
impl UserStore for PostgrestStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let payload = json!({
            "id": user.id,
            "email": &user.email,
            "name": &user.name,
            "password_hash": &user.password_hash,
            "role": user.role,
            "verified": user.verified,
            "created_at": user.created_at.to_rfc3339(),
            "updated_at": user.updated_at.to_rfc3339(),
        });

        let rows: Vec<User> = self
            .client
            .request(Method::POST, "/rest/v1/users", Some(payload), true)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    StoreError::Duplicate(format!("email {} is already registered", user.email))
                }
                other => other,
            })?;

        Self::first_or_not_found(rows)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let path = format!("/rest/v1/users?id=eq.{}", id);
        let rows: Vec<User> = self.client.request(Method::GET, &path, None, false).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let path = format!("/rest/v1/users?email=eq.{}", urlencoding::encode(email));
        let rows: Vec<User> = self.client.request(Method::GET, &path, None, false).await?;
        Ok(rows.into_iter().next())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> Result<User, StoreError> {
        let path = format!("/rest/v1/users?id=eq.{}", id);
        let payload = json!({
            "verified": verified,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows: Vec<User> = self
            .client
            .request(Method::PATCH, &path, Some(payload), true)
            .await?;
        Self::first_or_not_found(rows)
    }
}

#[async_trait]
impl ProviderStore for PostgrestStore {
    async fn insert_profile(&self, profile: ProviderProfile) -> Result<ProviderProfile, StoreError> {
        let payload = json!({
            "provider_id": profile.provider_id,
            "specialty": profile.specialty,
            "working_days": profile.working_days,
            "verification": profile.verification,
            "created_at": profile.created_at.to_rfc3339(),
            "updated_at": profile.updated_at.to_rfc3339(),
        });

        let rows: Vec<ProviderProfile> = self
            .client
            .request(Method::POST, "/rest/v1/provider_profiles", Some(payload), true)
            .await?;
        Self::first_or_not_found(rows)
    }

    async fn find_profile(&self, provider_id: Uuid) -> Result<Option<ProviderProfile>, StoreError> {
        let path = format!("/rest/v1/provider_profiles?provider_id=eq.{}", provider_id);
        let rows: Vec<ProviderProfile> =
            self.client.request(Method::GET, &path, None, false).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_profiles(
        &self,
        verification: VerificationStatus,
    ) -> Result<Vec<ProviderProfile>, StoreError> {
        let path = format!(
            "/rest/v1/provider_profiles?verification=eq.{}&order=provider_id.asc",
            verification
        );
        self.client.request(Method::GET, &path, None, false).await
    }

    async fn set_verification(
        &self,
        provider_id: Uuid,
        status: VerificationStatus,
    ) -> Result<ProviderProfile, StoreError> {
        let path = format!("/rest/v1/provider_profiles?provider_id=eq.{}", provider_id);
        let payload = json!({
            "verification": status,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows: Vec<ProviderProfile> = self
            .client
            .request(Method::PATCH, &path, Some(payload), true)
            .await?;
        Self::first_or_not_found(rows)
    }

    async fn set_working_days(
        &self,
        provider_id: Uuid,
        working_days: Vec<String>,
    ) -> Result<ProviderProfile, StoreError> {
        let path = format!("/rest/v1/provider_profiles?provider_id=eq.{}", provider_id);
        let payload = json!({
            "working_days": working_days,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows: Vec<ProviderProfile> = self
            .client
            .request(Method::PATCH, &path, Some(payload), true)
            .await?;
        Self::first_or_not_found(rows)
    }
}

#[async_trait]
impl AppointmentStore for PostgrestStore {
    async fn insert_scheduled(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let payload = json!({
            "id": appointment.id,
            "patient_id": appointment.patient_id,
            "provider_id": appointment.provider_id,
            "date": appointment.date,
            "slot": appointment.slot,
            "reason": appointment.reason,
            "status": appointment.status,
            "created_at": appointment.created_at.to_rfc3339(),
            "updated_at": appointment.updated_at.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self
            .client
            .request(Method::POST, "/rest/v1/appointments", Some(payload), true)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => StoreError::SlotTaken,
                other => other,
            })?;
        Self::first_or_not_found(rows)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self.client.request(Method::GET, &path, None, false).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,slot.asc",
            patient_id
        );
        self.client.request(Method::GET, &path, None, false).await
    }

    async fn list_for_provider(&self, provider_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&order=date.asc,slot.asc",
            provider_id
        );
        self.client.request(Method::GET, &path, None, false).await
    }

    async fn list_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&status=neq.cancelled&date=gte.{}&date=lt.{}&order=date.asc,slot.asc",
            provider_id, from, to
        );
        self.client.request(Method::GET, &path, None, false).await
    }

    async fn find_active_at(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&date=eq.{}&slot=eq.{}&status=neq.cancelled",
            provider_id,
            date,
            urlencoding::encode(slot)
        );
        if let Some(exclude_id) = exclude {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }

        let rows: Vec<Appointment> = self.client.request(Method::GET, &path, None, false).await?;
        Ok(rows.into_iter().next())
    }

    async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        slot: &str,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let payload = json!({
            "date": date,
            "slot": slot,
            "updated_at": now.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self
            .client
            .request(Method::PATCH, &path, Some(payload), true)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => StoreError::SlotTaken,
                other => other,
            })?;
        Self::first_or_not_found(rows)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Appointment, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let payload = json!({
            "status": status,
            "updated_at": now.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self
            .client
            .request(Method::PATCH, &path, Some(payload), true)
            .await?;
        Self::first_or_not_found(rows)
    }
}
