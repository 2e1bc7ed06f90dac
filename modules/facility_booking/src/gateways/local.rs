use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::FacilityBookingApi,
    error::FacilityBookingError,
    model::{
        AttendanceRecord, AttendanceStats, ClosedDate, DayAvailability, DaySlotFilter,
        FacilitySettings, IssuedToken, Principal, Reservation, ScanOutcome, SettingsPatch,
    },
};
use crate::domain::service::Service;

/// Local implementation of the FacilityBookingApi trait that delegates to the domain service
pub struct FacilityBookingLocalClient {
    service: Arc<Service>,
}

impl FacilityBookingLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl FacilityBookingApi for FacilityBookingLocalClient {
    async fn settings(&self) -> Result<FacilitySettings, FacilityBookingError> {
        Ok(self.service.get_settings().await?)
    }

    async fn update_settings(
        &self,
        requester: Principal,
        patch: SettingsPatch,
    ) -> Result<FacilitySettings, FacilityBookingError> {
        Ok(self.service.update_settings(requester, patch).await?)
    }

    async fn toggle_booking(&self, requester: Principal) -> Result<bool, FacilityBookingError> {
        Ok(self.service.toggle_booking(requester).await?)
    }

    async fn add_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Vec<ClosedDate>, FacilityBookingError> {
        Ok(self.service.add_closed_date(requester, date, reason).await?)
    }

    async fn remove_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
    ) -> Result<Vec<ClosedDate>, FacilityBookingError> {
        Ok(self.service.remove_closed_date(requester, date).await?)
    }

    async fn availability(&self, date: NaiveDate) -> Result<DayAvailability, FacilityBookingError> {
        Ok(self.service.availability(date).await?)
    }

    async fn reserve(
        &self,
        requester: Principal,
        date: NaiveDate,
        slot: String,
    ) -> Result<Reservation, FacilityBookingError> {
        Ok(self.service.reserve(requester, date, slot).await?)
    }

    async fn cancel_reservation(
        &self,
        requester: Principal,
        id: Uuid,
    ) -> Result<(), FacilityBookingError> {
        Ok(self.service.cancel_reservation(requester, id).await?)
    }

    async fn my_reservations(
        &self,
        requester: Principal,
    ) -> Result<Vec<Reservation>, FacilityBookingError> {
        Ok(self.service.my_reservations(requester).await?)
    }

    async fn list_reservations(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<Reservation>, FacilityBookingError> {
        Ok(self.service.list_reservations(requester, filter).await?)
    }

    async fn issue_token(&self, requester: Principal) -> Result<IssuedToken, FacilityBookingError> {
        Ok(self.service.issue_token(requester).await?)
    }

    async fn scan(
        &self,
        staff: Principal,
        token: String,
    ) -> Result<ScanOutcome, FacilityBookingError> {
        Ok(self.service.scan(staff, &token).await?)
    }

    async fn list_attendance(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<AttendanceRecord>, FacilityBookingError> {
        Ok(self.service.list_attendance(requester, filter).await?)
    }

    async fn my_attendance(
        &self,
        requester: Principal,
    ) -> Result<Vec<AttendanceRecord>, FacilityBookingError> {
        Ok(self.service.my_attendance(requester).await?)
    }

    async fn statistics(
        &self,
        requester: Principal,
    ) -> Result<AttendanceStats, FacilityBookingError> {
        Ok(self.service.statistics(requester).await?)
    }
}
