//! The in-process client maps domain failures onto the public contract errors.

mod common;

use facility_booking::contract::{FacilityBookingApi, FacilityBookingError};

use common::{day, member, setup_at, staff};

const NOW: &str = "2026-01-08T09:00:00Z";

#[tokio::test]
async fn local_client_round_trip() {
    let env = setup_at(NOW).await;
    env.use_morning(1).await;
    let client = env.module.client();
    let who = member();

    let settings = client.settings().await.unwrap();
    assert_eq!(settings.slots[0].name, "Morning");

    let r = client
        .reserve(who, day("2026-01-09"), "Morning".into())
        .await
        .unwrap();
    assert_eq!(client.my_reservations(who).await.unwrap(), vec![r.clone()]);

    let err = client
        .reserve(member(), day("2026-01-09"), "Morning".into())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FacilityBookingError::SlotFull {
            date: day("2026-01-09"),
            slot: "Morning".into()
        }
    );

    client.cancel_reservation(who, r.id).await.unwrap();
    let err = client.cancel_reservation(who, r.id).await.unwrap_err();
    assert_eq!(err, FacilityBookingError::NotFound { id: r.id });
}

#[tokio::test]
async fn local_client_reports_contract_errors() {
    let env = setup_at(NOW).await;
    let client = env.module.client();

    assert_eq!(
        client.toggle_booking(member()).await.unwrap_err(),
        FacilityBookingError::Forbidden
    );
    assert!(!client.toggle_booking(staff()).await.unwrap());

    assert_eq!(
        client
            .scan(staff(), "garbage".into())
            .await
            .unwrap_err(),
        FacilityBookingError::SignatureInvalid
    );

    let err = client
        .reserve(member(), day("2026-01-01"), "Morning".into())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FacilityBookingError::PastDate {
            date: day("2026-01-01")
        }
    );
}
