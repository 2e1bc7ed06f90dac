use anyhow::anyhow;
use sea_orm::Set;

use crate::contract::model::{
    AttendanceRecord, AttendanceStatus, ClosedDate, FacilitySettings, Reservation, SlotDefinition,
};
use crate::infra::storage::entity::{attendance, closed_date, reservation, settings, slot};

/// Assemble the aggregate from its three tables.
pub fn settings_to_contract(
    row: settings::Model,
    slots: Vec<slot::Model>,
    closed: Vec<closed_date::Model>,
) -> FacilitySettings {
    FacilitySettings {
        slots: slots.into_iter().map(slot_to_contract).collect(),
        booking_enabled: row.booking_enabled,
        closed_dates: closed
            .into_iter()
            .map(|c| ClosedDate {
                date: c.date,
                reason: c.reason,
            })
            .collect(),
        max_advance_booking_days: u32::try_from(row.max_advance_booking_days).unwrap_or(0),
        last_updated: row.last_updated,
        updated_by: row.updated_by,
    }
}

fn slot_to_contract(m: slot::Model) -> SlotDefinition {
    SlotDefinition {
        name: m.name,
        start_time: m.start_time,
        end_time: m.end_time,
        capacity: u32::try_from(m.capacity).unwrap_or(0),
        enabled: m.enabled,
    }
}

pub fn slot_to_active(position: usize, s: &SlotDefinition) -> slot::ActiveModel {
    slot::ActiveModel {
        name: Set(s.name.clone()),
        position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        start_time: Set(s.start_time.clone()),
        end_time: Set(s.end_time.clone()),
        capacity: Set(i32::try_from(s.capacity).unwrap_or(i32::MAX)),
        enabled: Set(s.enabled),
    }
}

pub fn closed_to_active(c: &ClosedDate) -> closed_date::ActiveModel {
    closed_date::ActiveModel {
        date: Set(c.date),
        reason: Set(c.reason.clone()),
    }
}

pub fn settings_to_active(s: &FacilitySettings) -> settings::ActiveModel {
    settings::ActiveModel {
        id: Set(settings::SINGLETON_ID),
        booking_enabled: Set(s.booking_enabled),
        max_advance_booking_days: Set(
            i32::try_from(s.max_advance_booking_days).unwrap_or(i32::MAX),
        ),
        last_updated: Set(s.last_updated),
        updated_by: Set(s.updated_by),
    }
}

impl From<reservation::Model> for Reservation {
    fn from(m: reservation::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            date: m.date,
            slot: m.slot,
            created_at: m.created_at,
        }
    }
}

impl TryFrom<attendance::Model> for AttendanceRecord {
    type Error = anyhow::Error;

    fn try_from(m: attendance::Model) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::parse(&m.status)
            .ok_or_else(|| anyhow!("unknown attendance status '{}' on {}", m.status, m.id))?;
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            reservation_id: m.reservation_id,
            date: m.date,
            slot: m.slot,
            check_in_time: m.check_in_time,
            scanned_by: m.scanned_by,
            status,
            notes: m.notes,
        })
    }
}

pub fn attendance_to_active(r: &AttendanceRecord) -> attendance::ActiveModel {
    attendance::ActiveModel {
        id: Set(r.id),
        user_id: Set(r.user_id),
        reservation_id: Set(r.reservation_id),
        date: Set(r.date),
        slot: Set(r.slot.clone()),
        check_in_time: Set(r.check_in_time),
        scanned_by: Set(r.scanned_by),
        status: Set(r.status.as_str().to_string()),
        notes: Set(r.notes.clone()),
    }
}
