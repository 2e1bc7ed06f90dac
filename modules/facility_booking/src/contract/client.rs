use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    error::FacilityBookingError,
    model::{
        AttendanceRecord, AttendanceStats, ClosedDate, DayAvailability, DaySlotFilter,
        FacilitySettings, IssuedToken, Principal, Reservation, ScanOutcome, SettingsPatch,
    },
};

/// Public API of the facility_booking module for in-process consumers.
#[async_trait]
pub trait FacilityBookingApi: Send + Sync {
    /// Current configuration, created with defaults on first access.
    async fn settings(&self) -> Result<FacilitySettings, FacilityBookingError>;

    async fn update_settings(
        &self,
        requester: Principal,
        patch: SettingsPatch,
    ) -> Result<FacilitySettings, FacilityBookingError>;

    /// Returns the new `booking_enabled` value.
    async fn toggle_booking(&self, requester: Principal) -> Result<bool, FacilityBookingError>;

    async fn add_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Vec<ClosedDate>, FacilityBookingError>;

    async fn remove_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
    ) -> Result<Vec<ClosedDate>, FacilityBookingError>;

    async fn availability(&self, date: NaiveDate) -> Result<DayAvailability, FacilityBookingError>;

    async fn reserve(
        &self,
        requester: Principal,
        date: NaiveDate,
        slot: String,
    ) -> Result<Reservation, FacilityBookingError>;

    async fn cancel_reservation(
        &self,
        requester: Principal,
        id: Uuid,
    ) -> Result<(), FacilityBookingError>;

    async fn my_reservations(
        &self,
        requester: Principal,
    ) -> Result<Vec<Reservation>, FacilityBookingError>;

    async fn list_reservations(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<Reservation>, FacilityBookingError>;

    async fn issue_token(&self, requester: Principal) -> Result<IssuedToken, FacilityBookingError>;

    async fn scan(
        &self,
        staff: Principal,
        token: String,
    ) -> Result<ScanOutcome, FacilityBookingError>;

    async fn list_attendance(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<AttendanceRecord>, FacilityBookingError>;

    async fn my_attendance(
        &self,
        requester: Principal,
    ) -> Result<Vec<AttendanceRecord>, FacilityBookingError>;

    async fn statistics(&self, requester: Principal)
        -> Result<AttendanceStats, FacilityBookingError>;
}
