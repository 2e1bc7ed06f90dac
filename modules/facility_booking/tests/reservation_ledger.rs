//! Reservation rules end to end: SeaORM storage on in-memory SQLite behind the
//! domain service, with a manual clock.

mod common;

use common::{day, member, setup_at, slot, staff};
use facility_booking::contract::model::{DaySlotFilter, SettingsPatch};
use facility_booking::domain::error::DomainError;

const NOW: &str = "2026-01-08T09:00:00Z";

#[tokio::test]
async fn capacity_two_admits_two_then_reports_full_and_duplicate() {
    let env = setup_at(NOW).await;
    env.use_morning(2).await;
    let (a, b, c) = (member(), member(), member());
    let date = day("2026-01-10");

    let ra = env.service.reserve(a, date, "Morning".into()).await.unwrap();
    assert_eq!(ra.user_id, a.id);
    env.service.reserve(b, date, "Morning".into()).await.unwrap();

    let err = env
        .service
        .reserve(c, date, "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotFull { capacity: 2, .. }), "{err}");

    // Duplicate is reported even though the slot is also full.
    let err = env
        .service
        .reserve(a, date, "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotDuplicate { .. }), "{err}");

    let avail = env.service.availability(date).await.unwrap();
    assert_eq!(avail.slots[0].booked, 2);
    assert_eq!(avail.slots[0].remaining, 0);
}

#[tokio::test]
async fn past_dates_are_rejected_but_today_is_allowed() {
    let env = setup_at(NOW).await;
    env.use_morning(5).await;

    let err = env
        .service
        .reserve(member(), day("2026-01-07"), "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PastDate { .. }));

    env.service
        .reserve(member(), day("2026-01-08"), "Morning".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn past_date_wins_over_every_configuration_rule() {
    let env = setup_at(NOW).await;
    env.use_morning(1).await;
    env.service.toggle_booking(staff()).await.unwrap();

    let err = env
        .service
        .reserve(member(), day("2025-12-31"), "Nowhere".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PastDate { .. }), "{err}");
}

#[tokio::test]
async fn advance_window_is_inclusive() {
    let env = setup_at(NOW).await;
    env.use_morning(5).await;

    // Default window is seven days.
    env.service
        .reserve(member(), day("2026-01-15"), "Morning".into())
        .await
        .unwrap();
    let err = env
        .service
        .reserve(member(), day("2026-01-16"), "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::AdvanceWindowExceeded { max_days: 7, .. }
    ));
}

#[tokio::test]
async fn rules_are_checked_in_order() {
    let env = setup_at(NOW).await;
    env.use_morning(5).await;
    let admin = staff();
    let date = day("2026-01-10");

    env.service
        .add_closed_date(admin, date, Some("Maintenance".into()))
        .await
        .unwrap();
    env.service.toggle_booking(admin).await.unwrap();

    // Disabled beats closed.
    let err = env
        .service
        .reserve(member(), date, "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BookingDisabled));

    env.service.toggle_booking(admin).await.unwrap();
    let err = env
        .service
        .reserve(member(), date, "Morning".into())
        .await
        .unwrap_err();
    match err {
        DomainError::DateClosed { reason, .. } => assert_eq!(reason, "Maintenance"),
        other => panic!("unexpected {other}"),
    }

    let err = env
        .service
        .reserve(member(), day("2026-01-11"), "Lunch".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownOrDisabledSlot { .. }));
}

#[tokio::test]
async fn disabled_slots_cannot_be_booked_and_are_hidden() {
    let env = setup_at(NOW).await;
    let mut evening = slot("Evening", "18:00", "20:00", 4);
    evening.enabled = false;
    env.use_slots(vec![slot("Morning", "08:00", "10:00", 2), evening])
        .await;

    let err = env
        .service
        .reserve(member(), day("2026-01-09"), "Evening".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownOrDisabledSlot { .. }));

    let avail = env.service.availability(day("2026-01-09")).await.unwrap();
    let names: Vec<_> = avail.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Morning"]);
}

#[tokio::test]
async fn cancellation_returns_the_seat() {
    let env = setup_at(NOW).await;
    env.use_morning(1).await;
    let who = member();
    let date = day("2026-01-09");

    let before = env.service.availability(date).await.unwrap();
    assert_eq!(before.slots[0].remaining, 1);

    let r = env.service.reserve(who, date, "Morning".into()).await.unwrap();
    assert_eq!(
        env.service.availability(date).await.unwrap().slots[0].remaining,
        0
    );

    env.service.cancel_reservation(who, r.id).await.unwrap();
    assert_eq!(
        env.service.availability(date).await.unwrap().slots[0].remaining,
        1
    );

    // Same member may book again after cancelling.
    env.service
        .reserve(who, date, "Morning".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn only_owner_or_staff_may_cancel() {
    let env = setup_at(NOW).await;
    env.use_morning(3).await;
    let owner = member();
    let date = day("2026-01-09");

    let r = env
        .service
        .reserve(owner, date, "Morning".into())
        .await
        .unwrap();

    let err = env
        .service
        .cancel_reservation(member(), r.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    env.service.cancel_reservation(staff(), r.id).await.unwrap();

    let err = env
        .service
        .cancel_reservation(owner, r.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ReservationNotFound { .. }));
}

#[tokio::test]
async fn concurrent_reservations_never_exceed_capacity() {
    let env = setup_at(NOW).await;
    env.use_morning(3).await;
    let date = day("2026-01-10");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let svc = env.service.clone();
        handles.push(tokio::spawn(async move {
            svc.reserve(member(), date, "Morning".into()).await
        }));
    }

    let mut ok = 0;
    let mut full = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(DomainError::SlotFull { .. }) => full += 1,
            Err(other) => panic!("unexpected {other}"),
        }
    }
    assert_eq!(ok, 3);
    assert_eq!(full, 7);
}

#[tokio::test]
async fn concurrent_duplicates_yield_one_reservation() {
    let env = setup_at(NOW).await;
    env.use_morning(10).await;
    let who = member();
    let date = day("2026-01-10");

    let mut handles = Vec::new();
    for _ in 0..5 {
        let svc = env.service.clone();
        handles.push(tokio::spawn(async move {
            svc.reserve(who, date, "Morning".into()).await
        }));
    }
    let results: Vec<_> = join_all(handles).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DomainError::SlotDuplicate { .. })));

    assert_eq!(env.service.my_reservations(who).await.unwrap().len(), 1);
}

async fn join_all<T>(handles: Vec<tokio::task::JoinHandle<T>>) -> Vec<T> {
    let mut out = Vec::with_capacity(handles.len());
    for h in handles {
        out.push(h.await.unwrap());
    }
    out
}

#[tokio::test]
async fn staff_listing_filters_and_orders() {
    let env = setup_at(NOW).await;
    env.use_slots(vec![
        slot("Morning", "08:00", "10:00", 5),
        slot("Evening", "18:00", "20:00", 5),
    ])
    .await;
    let who = member();

    env.service
        .reserve(who, day("2026-01-10"), "Morning".into())
        .await
        .unwrap();
    env.service
        .reserve(who, day("2026-01-09"), "Morning".into())
        .await
        .unwrap();
    env.service
        .reserve(member(), day("2026-01-09"), "Evening".into())
        .await
        .unwrap();

    let err = env
        .service
        .list_reservations(who, DaySlotFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let all = env
        .service
        .list_reservations(staff(), DaySlotFilter::default())
        .await
        .unwrap();
    let keys: Vec<_> = all
        .iter()
        .map(|r| (r.date.to_string(), r.slot.clone()))
        .collect();
    assert_eq!(
        keys,
        [
            ("2026-01-09".to_string(), "Evening".to_string()),
            ("2026-01-09".to_string(), "Morning".to_string()),
            ("2026-01-10".to_string(), "Morning".to_string()),
        ]
    );

    let morning_9th = env
        .service
        .list_reservations(
            staff(),
            DaySlotFilter {
                date: Some(day("2026-01-09")),
                slot: Some("Morning".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(morning_9th.len(), 1);
    assert_eq!(morning_9th[0].user_id, who.id);

    assert_eq!(env.service.my_reservations(who).await.unwrap().len(), 2);
}

#[tokio::test]
async fn capacity_reduction_keeps_existing_reservations() {
    let env = setup_at(NOW).await;
    env.use_morning(3).await;
    let date = day("2026-01-10");
    for _ in 0..3 {
        env.service
            .reserve(member(), date, "Morning".into())
            .await
            .unwrap();
    }

    env.service
        .update_settings(
            staff(),
            SettingsPatch {
                slots: Some(vec![slot("Morning", "08:00", "10:00", 1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let avail = env.service.availability(date).await.unwrap();
    assert_eq!(avail.slots[0].booked, 3);
    assert_eq!(avail.slots[0].remaining, 0);
    let err = env
        .service
        .reserve(member(), date, "Morning".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotFull { .. }));
}
