//! Shared fixtures: fresh in-memory SQLite with migrations, a manual clock and
//! an in-process member directory per test.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use facility_booking::contract::model::{MemberProfile, Principal, SettingsPatch, SlotDefinition};
use facility_booking::domain::ports::Clock;
use facility_booking::domain::service::Service;
use facility_booking::infra::members::InMemoryMemberDirectory;
use facility_booking::FacilityBooking;
use runtime::FacilityConfig;

pub const SECRET: &str = "integration-test-secret";

/// Clock that only moves when told to.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn at(rfc3339: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(ts(rfc3339))))
    }

    pub fn set(&self, rfc3339: &str) {
        *self.0.lock() = ts(rfc3339);
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

pub struct TestEnv {
    pub module: FacilityBooking,
    pub service: Arc<Service>,
    pub clock: Arc<ManualClock>,
    pub members: Arc<InMemoryMemberDirectory>,
}

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn facility_config() -> FacilityConfig {
    FacilityConfig {
        token_secret: SECRET.to_string(),
        utc_offset_minutes: 0,
        member_directory_url: None,
        members: Vec::new(),
    }
}

/// Module on a fresh in-memory database with the clock set to `now`.
pub async fn setup_at(now: &str) -> TestEnv {
    setup_with(now, facility_config()).await
}

pub async fn setup_with(now: &str, cfg: FacilityConfig) -> TestEnv {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    setup_on(db, now, cfg).await
}

/// Module on a caller-supplied connection.
pub async fn setup_on(db: DatabaseConnection, now: &str, cfg: FacilityConfig) -> TestEnv {
    let clock = ManualClock::at(now);
    let members = Arc::new(InMemoryMemberDirectory::new());
    let module = FacilityBooking::init(db, &cfg, members.clone(), clock.clone())
        .await
        .expect("Failed to init facility_booking");
    TestEnv {
        service: module.service(),
        module,
        clock,
        members,
    }
}

pub fn member() -> Principal {
    Principal::member(Uuid::new_v4())
}

pub fn staff() -> Principal {
    Principal::staff(Uuid::new_v4())
}

pub fn slot(name: &str, start: &str, end: &str, capacity: u32) -> SlotDefinition {
    SlotDefinition {
        name: name.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        capacity,
        enabled: true,
    }
}

impl TestEnv {
    /// Replace the slot list.
    pub async fn use_slots(&self, slots: Vec<SlotDefinition>) {
        self.service
            .update_settings(
                staff(),
                SettingsPatch {
                    slots: Some(slots),
                    ..Default::default()
                },
            )
            .await
            .expect("slot update");
    }

    /// Single "Morning" slot 08:00-10:00 with the given capacity.
    pub async fn use_morning(&self, capacity: u32) {
        self.use_slots(vec![slot("Morning", "08:00", "10:00", capacity)])
            .await;
    }

    /// Make `who` known to the member directory.
    pub fn register(&self, who: Principal, name: &str) -> MemberProfile {
        let profile = MemberProfile {
            id: who.id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            registration_no: Some(format!("REG-{}", &who.id.simple().to_string()[..6])),
            index_no: None,
        };
        self.members.upsert(profile.clone());
        profile
    }
}
