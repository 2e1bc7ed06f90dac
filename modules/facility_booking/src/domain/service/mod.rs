use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};

use crate::contract::model::{FacilitySettings, Principal};
use crate::domain::availability::facility_today;
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, MemberDirectory};
use crate::domain::repo::{AttendanceRepository, ReservationRepository, SettingsRepository};
use crate::domain::settings::default_settings;
use crate::domain::token::TokenSigner;

mod check_in;
mod config_store;
mod ledger;

/// Domain service with the reservation and attendance rules.
/// Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    settings: Arc<dyn SettingsRepository>,
    reservations: Arc<dyn ReservationRepository>,
    attendance: Arc<dyn AttendanceRepository>,
    members: Arc<dyn MemberDirectory>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub signer: TokenSigner,
    /// Facility-local zone used to decide what "today" is.
    pub utc_offset: FixedOffset,
}

impl ServiceConfig {
    pub fn new(token_secret: &str, utc_offset_minutes: i32) -> Result<Self, DomainError> {
        let utc_offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            DomainError::validation("utc_offset_minutes", "must be within one day")
        })?;
        Ok(Self {
            signer: TokenSigner::new(token_secret)?,
            utc_offset,
        })
    }
}

/// Storage ports the service composes.
#[derive(Clone)]
pub struct Repositories {
    pub settings: Arc<dyn SettingsRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repos: Repositories,
        members: Arc<dyn MemberDirectory>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            settings: repos.settings,
            reservations: repos.reservations,
            attendance: repos.attendance,
            members,
            clock,
            config,
        }
    }

    fn today(&self) -> NaiveDate {
        facility_today(self.clock.now(), self.config.utc_offset)
    }

    /// Fetch the configuration for this request, creating it on first use.
    async fn current_settings(&self) -> Result<FacilitySettings, DomainError> {
        let defaults = default_settings(self.clock.now());
        Ok(self.settings.load_or_init(&defaults).await?)
    }
}

fn require_staff(principal: &Principal, action: &str) -> Result<(), DomainError> {
    if !principal.is_staff() {
        return Err(DomainError::forbidden(action));
    }
    Ok(())
}
