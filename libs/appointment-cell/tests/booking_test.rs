use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Weekday};
use futures::future::join_all;

use appointment_cell::models::{
    AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest,
};
use appointment_cell::services::booking::BookingService;
use shared_database::state::AppState;
use shared_models::appointment::AppointmentStatus;
use shared_models::auth::Role;
use shared_utils::test_utils::{seed_provider, seed_user, test_state};

// A Monday, so "mon"-only providers accept it.
fn monday() -> NaiveDate {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    assert_eq!(chrono::Datelike::weekday(&date), Weekday::Mon);
    date
}

fn service(state: &Arc<AppState>) -> BookingService {
    BookingService::new(
        state.users.clone(),
        state.providers.clone(),
        state.appointments.clone(),
    )
}

fn request_for(provider_id: uuid::Uuid, slot: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        provider_id,
        date: monday(),
        slot: slot.to_string(),
        reason: "checkup".to_string(),
    }
}

#[tokio::test]
async fn exactly_one_concurrent_booking_wins_the_slot() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;

    let mut patients = Vec::new();
    for _ in 0..8 {
        patients.push(seed_user(&store, Role::Patient, false).await);
    }

    let service = Arc::new(service(&state));
    let attempts = patients.into_iter().map(|patient| {
        let service = Arc::clone(&service);
        let request = request_for(provider.id, "10:00");
        tokio::spawn(async move { service.book(patient.id, request).await })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("booking task panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppointmentError::SlotTaken)))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(conflicts, results.len() - 1);
}

#[tokio::test]
async fn cancelling_frees_the_slot_for_rebooking() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let first = seed_user(&store, Role::Patient, false).await;
    let second = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);
    let appointment = service
        .book(first.id, request_for(provider.id, "10:00"))
        .await
        .unwrap();

    // Slot is held.
    assert_matches!(
        service.book(second.id, request_for(provider.id, "10:00")).await,
        Err(AppointmentError::SlotTaken)
    );

    service.cancel(&appointment).await.unwrap();

    // The cancelled row stays behind but no longer blocks the slot.
    let rebooked = service
        .book(second.id, request_for(provider.id, "10:00"))
        .await
        .unwrap();
    assert_eq!(rebooked.patient_id, second.id);

    let original = service.get_appointment(appointment.id).await.unwrap();
    assert_eq!(original.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);
    let appointment = service
        .book(patient.id, request_for(provider.id, "09:00"))
        .await
        .unwrap();

    let first = service.cancel(&appointment).await.unwrap();
    assert_eq!(first.status, AppointmentStatus::Cancelled);

    // Second cancellation of the already-cancelled record is a no-op success.
    let second = service.cancel(&first).await.unwrap();
    assert_eq!(second.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn reschedule_conflict_leaves_the_appointment_unchanged() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);
    let _holder = service
        .book(patient.id, request_for(provider.id, "10:00"))
        .await
        .unwrap();
    let moving = service
        .book(patient.id, request_for(provider.id, "11:00"))
        .await
        .unwrap();

    let result = service
        .reschedule(
            &moving,
            RescheduleAppointmentRequest {
                date: monday(),
                slot: "10:00".to_string(),
            },
        )
        .await;
    assert_matches!(result, Err(AppointmentError::SlotTaken));

    let unchanged = service.get_appointment(moving.id).await.unwrap();
    assert_eq!(unchanged.slot, "11:00");
    assert_eq!(unchanged.date, monday());
    assert_eq!(unchanged.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn reschedule_within_the_same_slot_does_not_self_conflict() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);
    let appointment = service
        .book(patient.id, request_for(provider.id, "10:00"))
        .await
        .unwrap();

    let updated = service
        .reschedule(
            &appointment,
            RescheduleAppointmentRequest {
                date: monday(),
                slot: "10:00".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.slot, "10:00");
}

#[tokio::test]
async fn cancelled_appointments_cannot_be_rescheduled() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);
    let appointment = service
        .book(patient.id, request_for(provider.id, "10:00"))
        .await
        .unwrap();
    let cancelled = service.cancel(&appointment).await.unwrap();

    let result = service
        .reschedule(
            &cancelled,
            RescheduleAppointmentRequest {
                date: monday(),
                slot: "11:00".to_string(),
            },
        )
        .await;
    assert_matches!(result, Err(AppointmentError::AlreadyCancelled));
}

#[tokio::test]
async fn only_verified_doctor_accounts_are_bookable() {
    let (state, store) = test_state();
    let unverified = seed_provider(&store, false, &["mon"]).await;
    let plain_user = seed_user(&store, Role::Patient, false).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);

    assert_matches!(
        service.book(patient.id, request_for(unverified.id, "10:00")).await,
        Err(AppointmentError::ProviderNotBookable)
    );
    assert_matches!(
        service.book(patient.id, request_for(plain_user.id, "10:00")).await,
        Err(AppointmentError::ProviderNotBookable)
    );
    assert_matches!(
        service
            .book(patient.id, request_for(uuid::Uuid::new_v4(), "10:00"))
            .await,
        Err(AppointmentError::ProviderNotFound)
    );
}

#[tokio::test]
async fn bookings_must_land_on_the_grid_and_a_working_day() {
    let (state, store) = test_state();
    let provider = seed_provider(&store, true, &["mon"]).await;
    let patient = seed_user(&store, Role::Patient, false).await;

    let service = service(&state);

    assert_matches!(
        service.book(patient.id, request_for(provider.id, "09:30")).await,
        Err(AppointmentError::InvalidSlot(_))
    );

    let tuesday = monday() + chrono::Duration::days(1);
    let off_day = BookAppointmentRequest {
        provider_id: provider.id,
        date: tuesday,
        slot: "10:00".to_string(),
        reason: "checkup".to_string(),
    };
    assert_matches!(
        service.book(patient.id, off_day).await,
        Err(AppointmentError::NotWorkingDay(_))
    );
}
