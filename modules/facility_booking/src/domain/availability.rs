//! Admission rules for new reservations and the per-day availability view.
//!
//! Everything here is pure: callers fetch the configuration and occupancy
//! counts and pass "today" in, so the rules can be exercised without storage.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::contract::model::{DayAvailability, FacilitySettings, SlotAvailability, SlotDefinition};
use crate::domain::error::DomainError;

/// Calendar day at the facility for the instant `now`.
pub fn facility_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Whole-day comparison; a reservation for today is allowed.
pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    if date < today {
        return Err(DomainError::PastDate { date });
    }
    Ok(())
}

/// Configuration rules, evaluated in order and short-circuiting on the first
/// failure: booking switch, closure, advance window, slot existence.
///
/// Returns the slot definition whose capacity the ledger must enforce.
pub fn admit<'a>(
    settings: &'a FacilitySettings,
    today: NaiveDate,
    date: NaiveDate,
    slot: &str,
) -> Result<&'a SlotDefinition, DomainError> {
    if !settings.booking_enabled {
        return Err(DomainError::BookingDisabled);
    }

    if let Some(closure) = settings.closure_on(date) {
        return Err(DomainError::date_closed(date, closure.reason.clone()));
    }

    let days_ahead = (date - today).num_days();
    if days_ahead > i64::from(settings.max_advance_booking_days) {
        return Err(DomainError::AdvanceWindowExceeded {
            date,
            max_days: settings.max_advance_booking_days,
        });
    }

    settings
        .slot(slot)
        .filter(|s| s.enabled)
        .ok_or_else(|| DomainError::unknown_slot(slot))
}

pub fn ensure_capacity(
    slot: &SlotDefinition,
    date: NaiveDate,
    booked: u64,
) -> Result<(), DomainError> {
    if booked >= u64::from(slot.capacity) {
        return Err(DomainError::slot_full(date, slot.name.clone(), slot.capacity));
    }
    Ok(())
}

/// Remaining capacity of every enabled slot, in configuration order.
pub fn day_availability(
    settings: &FacilitySettings,
    date: NaiveDate,
    counts: &HashMap<String, u64>,
) -> DayAvailability {
    let slots = settings
        .slots
        .iter()
        .filter(|s| s.enabled)
        .map(|s| {
            let booked = counts.get(&s.name).copied().unwrap_or(0);
            let booked = u32::try_from(booked).unwrap_or(u32::MAX);
            SlotAvailability {
                name: s.name.clone(),
                start_time: s.start_time.clone(),
                end_time: s.end_time.clone(),
                capacity: s.capacity,
                booked,
                remaining: s.capacity.saturating_sub(booked),
            }
        })
        .collect();

    DayAvailability {
        date,
        booking_enabled: settings.booking_enabled,
        closure: settings.closure_on(date).cloned(),
        slots,
    }
}
