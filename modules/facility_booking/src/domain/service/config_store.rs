use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use super::{require_staff, Service};
use crate::contract::model::{ClosedDate, FacilitySettings, Principal, SettingsPatch};
use crate::domain::error::DomainError;
use crate::domain::settings::{closure_reason, validate_patch};

impl Service {
    #[instrument(name = "facility_booking.service.get_settings", skip(self))]
    pub async fn get_settings(&self) -> Result<FacilitySettings, DomainError> {
        debug!("Loading facility settings");
        self.current_settings().await
    }

    #[instrument(
        name = "facility_booking.service.update_settings",
        skip(self, patch),
        fields(user_id = %requester.id)
    )]
    pub async fn update_settings(
        &self,
        requester: Principal,
        patch: SettingsPatch,
    ) -> Result<FacilitySettings, DomainError> {
        require_staff(&requester, "update settings")?;
        let patch = validate_patch(patch)?;

        self.current_settings().await?;
        let updated = self
            .settings
            .apply_patch(&patch, requester.id, self.clock.now())
            .await?;

        info!(
            slots = updated.slots.len(),
            booking_enabled = updated.booking_enabled,
            "Facility settings updated"
        );
        Ok(updated)
    }

    #[instrument(
        name = "facility_booking.service.toggle_booking",
        skip(self),
        fields(user_id = %requester.id)
    )]
    pub async fn toggle_booking(&self, requester: Principal) -> Result<bool, DomainError> {
        require_staff(&requester, "toggle booking")?;

        self.current_settings().await?;
        let enabled = self
            .settings
            .toggle_booking(requester.id, self.clock.now())
            .await?;

        info!(booking_enabled = enabled, "Booking switch toggled");
        Ok(enabled)
    }

    #[instrument(
        name = "facility_booking.service.add_closed_date",
        skip(self, reason),
        fields(user_id = %requester.id, date = %date)
    )]
    pub async fn add_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Vec<ClosedDate>, DomainError> {
        require_staff(&requester, "close dates")?;

        self.current_settings().await?;
        let closed = ClosedDate {
            date,
            reason: closure_reason(reason),
        };
        let inserted = self
            .settings
            .add_closed_date(&closed, requester.id, self.clock.now())
            .await?;
        if !inserted {
            return Err(DomainError::DuplicateClosure { date });
        }

        info!(reason = %closed.reason, "Date closed");
        Ok(self.current_settings().await?.closed_dates)
    }

    #[instrument(
        name = "facility_booking.service.remove_closed_date",
        skip(self),
        fields(user_id = %requester.id, date = %date)
    )]
    pub async fn remove_closed_date(
        &self,
        requester: Principal,
        date: NaiveDate,
    ) -> Result<Vec<ClosedDate>, DomainError> {
        require_staff(&requester, "reopen dates")?;

        self.current_settings().await?;
        let removed = self
            .settings
            .remove_closed_date(date, requester.id, self.clock.now())
            .await?;
        if removed {
            info!("Date reopened");
        } else {
            debug!("Date was not closed; nothing to remove");
        }

        Ok(self.current_settings().await?.closed_dates)
    }
}
