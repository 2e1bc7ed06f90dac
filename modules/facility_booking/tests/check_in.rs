mod common;

use chrono::Duration;
use facility_booking::contract::model::{
    AttendanceStatus, DaySlotFilter, Principal, ScanOutcome,
};
use facility_booking::domain::error::DomainError;
use facility_booking::domain::token::TokenSigner;
use facility_booking::FacilityBooking;
use runtime::MemberSeed;
use sea_orm::Database;

use common::{
    day, facility_config, member, setup_at, setup_with, slot, staff, ts, ManualClock, TestEnv,
};

/// Reservation day; the clock starts at the door opening.
const TODAY: &str = "2026-01-10";
const OPENING: &str = "2026-01-10T08:00:00Z";

async fn booked_member(env: &TestEnv, slot_name: &str) -> Principal {
    let who = member();
    env.register(who, "Ada");
    env.service
        .reserve(who, day(TODAY), slot_name.into())
        .await
        .unwrap();
    who
}

#[tokio::test]
async fn token_carries_identity_and_five_minute_expiry() {
    let env = setup_at(OPENING).await;
    let who = member();
    let profile = env.register(who, "Ada");

    let issued = env.service.issue_token(who).await.unwrap();
    assert_eq!(issued.issued_at, ts(OPENING));
    assert_eq!(issued.expires_at, ts(OPENING) + Duration::minutes(5));

    let claims = TokenSigner::new(common::SECRET)
        .unwrap()
        .verify(&issued.token, ts(OPENING))
        .unwrap();
    assert_eq!(claims.sub, who.id);
    assert_eq!(claims.jti, issued.token_id);
    assert_eq!(claims.name, profile.name);
    assert_eq!(claims.email, profile.email);
    assert_eq!(claims.registration_no, profile.registration_no);
}

#[tokio::test]
async fn unknown_member_gets_no_token() {
    let env = setup_at(OPENING).await;
    let err = env.service.issue_token(member()).await.unwrap_err();
    assert!(matches!(err, DomainError::MemberNotFound { .. }));
}

#[tokio::test]
async fn configured_members_can_get_tokens() {
    let who = member();
    let mut cfg = facility_config();
    cfg.members.push(MemberSeed {
        id: who.id,
        name: "Grace".into(),
        email: "grace@example.org".into(),
        registration_no: None,
        index_no: Some("IX-7".into()),
    });

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let module = FacilityBooking::init(
        db,
        &cfg,
        FacilityBooking::in_process_directory(&cfg),
        ManualClock::at(OPENING),
    )
    .await
    .unwrap();
    let service = module.service();

    let issued = service.issue_token(who).await.unwrap();
    let claims = TokenSigner::new(common::SECRET)
        .unwrap()
        .verify(&issued.token, ts(OPENING))
        .unwrap();
    assert_eq!(claims.sub, who.id);
    assert_eq!(claims.name, "Grace");
    assert_eq!(claims.email, "grace@example.org");

    let err = service.issue_token(member()).await.unwrap_err();
    assert!(matches!(err, DomainError::MemberNotFound { .. }));
}

#[tokio::test]
async fn scan_records_once_then_reports_existing_record() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let door = staff();

    let token = env.service.issue_token(who).await.unwrap().token;
    env.clock.advance(Duration::seconds(30));

    let first = env.service.scan(door, &token).await.unwrap();
    let rec = match &first {
        ScanOutcome::Recorded(rec) => rec.clone(),
        other => panic!("expected a new record, got {other:?}"),
    };
    assert_eq!(rec.user_id, who.id);
    assert_eq!(rec.scanned_by, door.id);
    assert_eq!(rec.slot, "Morning");
    assert_eq!(rec.date, day(TODAY));
    assert_eq!(rec.status, AttendanceStatus::Present);
    assert_eq!(rec.check_in_time, ts(OPENING) + Duration::seconds(30));

    let second = env.service.scan(staff(), &token).await.unwrap();
    match second {
        ScanOutcome::AlreadyCheckedIn(existing) => assert_eq!(existing, rec),
        other => panic!("expected already-checked-in, got {other:?}"),
    }

    let all = env
        .service
        .list_attendance(door, DaySlotFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn token_is_valid_until_just_before_five_minutes() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let token = env.service.issue_token(who).await.unwrap().token;

    env.clock.advance(Duration::seconds(4 * 60 + 59));
    assert!(env.service.scan(staff(), &token).await.is_ok());
}

#[tokio::test]
async fn token_past_five_minutes_is_expired() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let token = env.service.issue_token(who).await.unwrap().token;

    env.clock.advance(Duration::seconds(5 * 60 + 1));
    let err = env.service.scan(staff(), &token).await.unwrap_err();
    assert!(matches!(err, DomainError::Expired { .. }), "{err}");

    // Nothing was recorded.
    let recorded = env.service.my_attendance(who).await.unwrap();
    assert!(recorded.is_empty());
}

#[tokio::test]
async fn foreign_or_tampered_tokens_are_rejected() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;

    // Same member, signed elsewhere.
    let mut other_cfg = facility_config();
    other_cfg.token_secret = "some-other-secret".into();
    let other = setup_with(OPENING, other_cfg).await;
    other.register(who, "Ada");
    let foreign = other.service.issue_token(who).await.unwrap().token;

    let err = env.service.scan(staff(), &foreign).await.unwrap_err();
    assert!(matches!(err, DomainError::SignatureInvalid));

    let genuine = env.service.issue_token(who).await.unwrap().token;
    let mut parts: Vec<&str> = genuine.split('.').collect();
    let forged_claims = parts[1].chars().rev().collect::<String>();
    parts[1] = &forged_claims;
    let err = env
        .service
        .scan(staff(), &parts.join("."))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SignatureInvalid));

    let err = env.service.scan(staff(), "not-a-token").await.unwrap_err();
    assert!(matches!(err, DomainError::SignatureInvalid));
}

#[tokio::test]
async fn bad_signature_is_reported_even_when_expired() {
    let env = setup_at(OPENING).await;
    let who = member();
    let mut other_cfg = facility_config();
    other_cfg.token_secret = "some-other-secret".into();
    let other = setup_with(OPENING, other_cfg).await;
    other.register(who, "Ada");
    let foreign = other.service.issue_token(who).await.unwrap().token;

    env.clock.advance(Duration::hours(1));
    let err = env.service.scan(staff(), &foreign).await.unwrap_err();
    assert!(matches!(err, DomainError::SignatureInvalid));
}

#[tokio::test]
async fn only_staff_can_scan() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let token = env.service.issue_token(who).await.unwrap().token;

    let err = env.service.scan(who, &token).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[tokio::test]
async fn no_reservation_today_means_no_check_in() {
    let env = setup_at("2026-01-09T08:00:00Z").await;
    env.use_morning(5).await;
    let who = member();
    env.register(who, "Ada");
    // Booked for tomorrow only.
    env.service
        .reserve(who, day(TODAY), "Morning".into())
        .await
        .unwrap();

    let token = env.service.issue_token(who).await.unwrap().token;
    let err = env.service.scan(staff(), &token).await.unwrap_err();
    assert!(matches!(err, DomainError::NoReservation { .. }));
}

#[tokio::test]
async fn several_reservations_are_checked_in_in_slot_order() {
    let env = setup_at(OPENING).await;
    // Configuration order differs from alphabetical order.
    env.use_slots(vec![
        slot("Morning", "08:00", "10:00", 5),
        slot("Evening", "18:00", "20:00", 5),
    ])
    .await;
    let who = member();
    env.register(who, "Ada");
    env.service
        .reserve(who, day(TODAY), "Evening".into())
        .await
        .unwrap();
    env.service
        .reserve(who, day(TODAY), "Morning".into())
        .await
        .unwrap();
    let door = staff();

    let token = env.service.issue_token(who).await.unwrap().token;
    let first = env.service.scan(door, &token).await.unwrap();
    assert!(matches!(first, ScanOutcome::Recorded(ref r) if r.slot == "Morning"));

    let second = env.service.scan(door, &token).await.unwrap();
    assert!(matches!(second, ScanOutcome::Recorded(ref r) if r.slot == "Evening"));

    let third = env.service.scan(door, &token).await.unwrap();
    assert!(matches!(third, ScanOutcome::AlreadyCheckedIn(ref r) if r.slot == "Morning"));
}

#[tokio::test]
async fn concurrent_scans_record_one_attendance() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let token = env.service.issue_token(who).await.unwrap().token;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let svc = env.service.clone();
        let token = token.clone();
        handles.push(tokio::spawn(
            async move { svc.scan(staff(), &token).await },
        ));
    }
    let mut recorded = 0;
    for h in handles {
        if let ScanOutcome::Recorded(_) = h.await.unwrap().unwrap() {
            recorded += 1;
        }
    }
    assert_eq!(recorded, 1);
    assert_eq!(env.service.my_attendance(who).await.unwrap().len(), 1);
}

#[tokio::test]
async fn attendance_listing_and_statistics() {
    let env = setup_at(OPENING).await;
    env.use_slots(vec![
        slot("Morning", "08:00", "10:00", 5),
        slot("Evening", "18:00", "20:00", 5),
    ])
    .await;
    let door = staff();

    let a = booked_member(&env, "Morning").await;
    let b = booked_member(&env, "Morning").await;
    let _c = booked_member(&env, "Evening").await;

    let ta = env.service.issue_token(a).await.unwrap().token;
    env.service.scan(door, &ta).await.unwrap();
    env.clock.advance(Duration::minutes(2));
    let tb = env.service.issue_token(b).await.unwrap().token;
    env.service.scan(door, &tb).await.unwrap();

    let listed = env
        .service
        .list_attendance(
            door,
            DaySlotFilter {
                date: Some(day(TODAY)),
                slot: Some("Morning".into()),
            },
        )
        .await
        .unwrap();
    // Newest check-in first.
    let order: Vec<_> = listed.iter().map(|r| r.user_id).collect();
    assert_eq!(order, [b.id, a.id]);

    let err = env
        .service
        .list_attendance(a, DaySlotFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let stats = env.service.statistics(door).await.unwrap();
    assert_eq!(stats.date, day(TODAY));
    assert_eq!(stats.total_attendances, 2);
    assert_eq!(stats.day_attendances, 2);
    assert_eq!(stats.day_reservations, 3);
    assert_eq!(stats.attendance_rate, 66.7);
    let by_slot: Vec<_> = stats
        .reservations_by_slot
        .iter()
        .map(|s| (s.slot.as_str(), s.count))
        .collect();
    assert_eq!(by_slot, [("Evening", 1), ("Morning", 2)]);

    assert!(matches!(
        env.service.statistics(a).await.unwrap_err(),
        DomainError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn cancelled_reservation_keeps_its_attendance() {
    let env = setup_at(OPENING).await;
    env.use_morning(5).await;
    let who = booked_member(&env, "Morning").await;
    let token = env.service.issue_token(who).await.unwrap().token;
    let rec = env.service.scan(staff(), &token).await.unwrap().record().clone();

    env.service
        .cancel_reservation(who, rec.reservation_id)
        .await
        .unwrap();

    let history = env.service.my_attendance(who).await.unwrap();
    assert_eq!(history, vec![rec]);
}
