use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use shared_database::memory::MemoryStore;
use shared_database::store::{AppointmentStore, StoreError, UserStore};
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::{Role, User};

fn user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: "Test".to_string(),
        password_hash: "hash".to_string(),
        role: Role::Patient,
        verified: false,
        created_at: now,
        updated_at: now,
    }
}

fn appointment(provider_id: Uuid, date: NaiveDate, slot: &str) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        provider_id,
        date,
        slot: slot.to_string(),
        reason: "checkup".to_string(),
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn email_uniqueness_is_enforced() {
    let store = MemoryStore::new();
    store.insert_user(user("same@example.com")).await.unwrap();

    let result = store.insert_user(user("same@example.com")).await;
    assert_matches!(result, Err(StoreError::Duplicate(_)));
}

#[tokio::test]
async fn range_listing_is_inclusive_exclusive() {
    let store = MemoryStore::new();
    let provider_id = Uuid::new_v4();
    let day = |d: u32| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();

    store
        .insert_scheduled(appointment(provider_id, day(1), "09:00"))
        .await
        .unwrap();
    store
        .insert_scheduled(appointment(provider_id, day(2), "09:00"))
        .await
        .unwrap();
    store
        .insert_scheduled(appointment(provider_id, day(8), "09:00"))
        .await
        .unwrap();

    let listed = store
        .list_active_for_provider_in_range(provider_id, day(2), day(8))
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].date, day(2));
}

#[tokio::test]
async fn a_cancelled_row_does_not_hold_its_slot() {
    let store = MemoryStore::new();
    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

    let first = store
        .insert_scheduled(appointment(provider_id, date, "10:00"))
        .await
        .unwrap();

    assert_matches!(
        store
            .insert_scheduled(appointment(provider_id, date, "10:00"))
            .await,
        Err(StoreError::SlotTaken)
    );

    store
        .set_status(first.id, AppointmentStatus::Cancelled, Utc::now())
        .await
        .unwrap();

    // Tuple is free again; the cancelled row itself is retained.
    store
        .insert_scheduled(appointment(provider_id, date, "10:00"))
        .await
        .unwrap();
    assert!(store.find_appointment(first.id).await.unwrap().is_some());
}

#[tokio::test]
async fn reschedule_rejects_an_occupied_target() {
    let store = MemoryStore::new();
    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

    store
        .insert_scheduled(appointment(provider_id, date, "10:00"))
        .await
        .unwrap();
    let moving = store
        .insert_scheduled(appointment(provider_id, date, "11:00"))
        .await
        .unwrap();

    let result = store.reschedule(moving.id, date, "10:00", Utc::now()).await;
    assert_matches!(result, Err(StoreError::SlotTaken));

    // Moving onto its own slot is not a collision.
    let moved = store
        .reschedule(moving.id, date, "11:00", Utc::now())
        .await
        .unwrap();
    assert_eq!(moved.slot, "11:00");
}
