use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::contract::model::{
    AttendanceRecord, ClosedDate, DaySlotFilter, FacilitySettings, Reservation, SettingsPatch,
};

/// Persistence port for the configuration singleton.
///
/// Every method is a single atomic unit: readers never observe half of a mutation.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Return the stored configuration, inserting `defaults` if none exists.
    ///
    /// Concurrent first calls must converge on one row (first writer wins).
    async fn load_or_init(&self, defaults: &FacilitySettings) -> anyhow::Result<FacilitySettings>;

    /// Apply the present fields of `patch` and stamp the mutation.
    async fn apply_patch(
        &self,
        patch: &SettingsPatch,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<FacilitySettings>;

    /// Flip `booking_enabled` in place and return the new value.
    async fn toggle_booking(&self, by: Uuid, at: DateTime<Utc>) -> anyhow::Result<bool>;

    /// Insert a closure. Returns false when the date is already closed.
    async fn add_closed_date(
        &self,
        closed: &ClosedDate,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Remove a closure. Returns true if a row was deleted.
    async fn remove_closed_date(
        &self,
        date: NaiveDate,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
}

/// Outcome of the ledger's compare-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerInsert {
    Inserted,
    /// Occupancy already reached the ceiling; nothing was written.
    Full,
    /// (user, date, slot) already exists; nothing was written.
    Duplicate,
}

/// Persistence port for the reservation ledger.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert `r` only if fewer than `capacity` reservations exist for its
    /// (date, slot). The decision and the write happen in one statement.
    async fn insert_within_capacity(
        &self,
        r: &Reservation,
        capacity: u32,
    ) -> anyhow::Result<LedgerInsert>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>>;

    /// Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn exists(&self, user_id: Uuid, date: NaiveDate, slot: &str) -> anyhow::Result<bool>;

    /// Ordered by date, then slot.
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>>;

    /// Reservations of one member on one day, ordered by slot.
    async fn list_for_user_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Reservation>>;

    /// Ordered by date, then slot.
    async fn list(&self, filter: &DaySlotFilter) -> anyhow::Result<Vec<Reservation>>;

    async fn count_by_date_and_slot(&self, date: NaiveDate, slot: &str) -> anyhow::Result<u64>;

    /// Occupancy of every slot with at least one reservation on `date`.
    async fn counts_for_date(&self, date: NaiveDate) -> anyhow::Result<HashMap<String, u64>>;
}

/// Outcome of the attendance log's create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceInsert {
    Inserted(AttendanceRecord),
    /// A record for (user, reservation) already existed; it is returned untouched.
    Existing(AttendanceRecord),
}

/// Persistence port for the attendance log.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert guarded by the (user, reservation) uniqueness constraint.
    async fn insert_if_absent(&self, rec: &AttendanceRecord) -> anyhow::Result<AttendanceInsert>;

    async fn find_for_reservation(
        &self,
        user_id: Uuid,
        reservation_id: Uuid,
    ) -> anyhow::Result<Option<AttendanceRecord>>;

    /// Newest check-in first.
    async fn list(&self, filter: &DaySlotFilter) -> anyhow::Result<Vec<AttendanceRecord>>;

    /// Newest check-in first.
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<AttendanceRecord>>;

    async fn count_all(&self) -> anyhow::Result<u64>;

    async fn count_on(&self, date: NaiveDate) -> anyhow::Result<u64>;
}
