use std::collections::HashSet;

use chrono::{DateTime, NaiveTime, Utc};

use crate::contract::model::{ClosedDate, FacilitySettings, SettingsPatch, SlotDefinition};
use crate::domain::error::DomainError;

pub const DEFAULT_ADVANCE_DAYS: u32 = 7;
pub const DEFAULT_CLOSURE_REASON: &str = "Closed";

/// Configuration materialized on first access.
pub fn default_settings(now: DateTime<Utc>) -> FacilitySettings {
    FacilitySettings {
        slots: vec![
            SlotDefinition {
                name: "4:00 PM - 6:00 PM".to_string(),
                start_time: "16:00".to_string(),
                end_time: "18:00".to_string(),
                capacity: 10,
                enabled: true,
            },
            SlotDefinition {
                name: "6:00 PM - 8:00 PM".to_string(),
                start_time: "18:00".to_string(),
                end_time: "20:00".to_string(),
                capacity: 10,
                enabled: true,
            },
        ],
        booking_enabled: true,
        closed_dates: Vec::new(),
        max_advance_booking_days: DEFAULT_ADVANCE_DAYS,
        last_updated: now,
        updated_by: None,
    }
}

pub fn closure_reason(reason: Option<String>) -> String {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_CLOSURE_REASON.to_string())
}

/// Normalize and validate a patch before it reaches storage.
pub fn validate_patch(mut patch: SettingsPatch) -> Result<SettingsPatch, DomainError> {
    if patch.is_empty() {
        return Err(DomainError::validation("patch", "no fields to update"));
    }

    if let Some(slots) = patch.slots.as_mut() {
        let mut seen = HashSet::new();
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.name = slot.name.trim().to_string();
            if slot.name.is_empty() {
                return Err(DomainError::validation(
                    format!("slots[{i}].name"),
                    "must not be empty",
                ));
            }
            if !seen.insert(slot.name.clone()) {
                return Err(DomainError::validation(
                    format!("slots[{i}].name"),
                    format!("duplicate slot '{}'", slot.name),
                ));
            }
            if slot.capacity == 0 {
                return Err(DomainError::validation(
                    format!("slots[{i}].capacity"),
                    "must be at least 1",
                ));
            }
            let start = parse_clock(&slot.start_time).ok_or_else(|| {
                DomainError::validation(format!("slots[{i}].start_time"), "expected HH:MM")
            })?;
            let end = parse_clock(&slot.end_time).ok_or_else(|| {
                DomainError::validation(format!("slots[{i}].end_time"), "expected HH:MM")
            })?;
            if start >= end {
                return Err(DomainError::validation(
                    format!("slots[{i}]"),
                    "start_time must be before end_time",
                ));
            }
        }
    }

    if let Some(closed) = patch.closed_dates.as_mut() {
        let mut seen = HashSet::new();
        for (i, c) in closed.iter_mut().enumerate() {
            if !seen.insert(c.date) {
                return Err(DomainError::validation(
                    format!("closed_dates[{i}].date"),
                    format!("{} listed twice", c.date),
                ));
            }
            c.reason = closure_reason(Some(std::mem::take(&mut c.reason)));
        }
        closed.sort_by_key(|c: &ClosedDate| c.date);
    }

    Ok(patch)
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}
