//! Fixtures shared by the cell test suites: a memory-backed `AppState`,
//! canned users, and session token factories.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::memory::MemoryStore;
use shared_database::state::AppState;
use shared_database::store::{AppointmentStore, ProviderStore, UserStore};
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::{Role, User};
use shared_models::provider::{ProviderProfile, VerificationStatus};

use crate::jwt;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-token-signing-must-be-long-enough";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        database_url: String::new(),
        database_api_key: String::new(),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

/// A memory-backed state plus the concrete store handle for direct seeding.
pub fn test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::with_store(test_config(), store.clone()));
    (state, store)
}

/// A user record that has not been persisted anywhere.
pub fn new_user(role: Role, verified: bool) -> User {
    let id = Uuid::new_v4();
    let now = Utc::now();
    User {
        id,
        email: format!("user-{}@example.com", id),
        name: "Test User".to_string(),
        password_hash: "unusable-placeholder-hash".to_string(),
        role,
        verified,
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_user(store: &Arc<MemoryStore>, role: Role, verified: bool) -> User {
    let user = new_user(role, verified);
    store
        .insert_user(user)
        .await
        .expect("seeding a fresh user cannot collide")
}

/// Seed a doctor account together with its provider profile.
pub async fn seed_provider(
    store: &Arc<MemoryStore>,
    verified: bool,
    working_days: &[&str],
) -> User {
    let user = seed_user(store, Role::Doctor, verified).await;
    let now = Utc::now();
    store
        .insert_profile(ProviderProfile {
            provider_id: user.id,
            specialty: Some("General Practice".to_string()),
            working_days: working_days.iter().map(|d| d.to_string()).collect(),
            verification: if verified {
                VerificationStatus::Approved
            } else {
                VerificationStatus::Pending
            },
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seeding a provider profile");
    user
}

/// Persist a scheduled appointment straight into the store.
pub async fn seed_appointment(
    store: &Arc<MemoryStore>,
    patient_id: Uuid,
    provider_id: Uuid,
    date: NaiveDate,
    slot: &str,
) -> Appointment {
    let now = Utc::now();
    store
        .insert_scheduled(Appointment {
            id: Uuid::new_v4(),
            patient_id,
            provider_id,
            date,
            slot: slot.to_string(),
            reason: "seeded appointment".to_string(),
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seeded slot is free")
}

/// A valid bearer token for the given user, signed with the test secret.
pub fn bearer(user: &User) -> String {
    jwt::issue(user, TEST_JWT_SECRET)
}
