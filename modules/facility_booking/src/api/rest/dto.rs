use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    AttendanceRecord, AttendanceStats, ClosedDate, DayAvailability, DaySlotFilter,
    FacilitySettings, IssuedToken, Reservation, ScanOutcome, SettingsPatch, SlotAvailability,
    SlotCount, SlotDefinition,
};
use crate::domain::error::DomainError;

/// Calendar dates travel as `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a user-supplied date, reporting the offending field on failure.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::validation(field, format!("'{raw}' is not a YYYY-MM-DD date")))
}

/// REST DTO for a slot definition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub name: String,
    /// Facility-local `HH:MM`.
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClosedDateDto {
    pub date: NaiveDate,
    pub reason: String,
}

/// Closed date as accepted inside a settings patch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClosedDateInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsDto {
    pub slots: Vec<SlotDto>,
    pub booking_enabled: bool,
    pub closed_dates: Vec<ClosedDateDto>,
    pub max_advance_booking_days: u32,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

/// REST DTO for a partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsReq {
    pub slots: Option<Vec<SlotDto>>,
    pub booking_enabled: Option<bool>,
    pub closed_dates: Option<Vec<ClosedDateInput>>,
    pub max_advance_booking_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingSwitchDto {
    pub booking_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddClosedDateReq {
    /// `YYYY-MM-DD`
    pub date: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClosedDatesDto {
    pub closed_dates: Vec<ClosedDateDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotAvailabilityDto {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    pub booked: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub date: NaiveDate,
    pub booking_enabled: bool,
    pub closure: Option<ClosedDateDto>,
    pub slots: Vec<SlotAvailabilityDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReserveReq {
    /// `YYYY-MM-DD`
    pub date: String,
    pub slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationListDto {
    pub reservations: Vec<ReservationDto>,
    pub total: usize,
}

/// Optional narrowing shared by the staff listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DaySlotQuery {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub slot: Option<String>,
}

impl DaySlotQuery {
    pub fn into_filter(self) -> Result<DaySlotFilter, DomainError> {
        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_date("date", &d))
            .transpose()?;
        Ok(DaySlotFilter {
            date,
            slot: self.slot.filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedTokenDto {
    pub token: String,
    pub token_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanReq {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reservation_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    pub check_in_time: DateTime<Utc>,
    pub scanned_by: Uuid,
    /// `present`, `late` or `absent`
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceListDto {
    pub attendance: Vec<AttendanceDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanResult {
    Recorded,
    AlreadyCheckedIn,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanResultDto {
    pub result: ScanResult,
    pub attendance: AttendanceDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotCountDto {
    pub slot: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsDto {
    pub date: NaiveDate,
    pub total_attendances: u64,
    pub day_attendances: u64,
    pub day_reservations: u64,
    pub attendance_rate: f64,
    pub reservations_by_slot: Vec<SlotCountDto>,
}

// Conversion implementations between REST DTOs and contract models

impl From<SlotDefinition> for SlotDto {
    fn from(s: SlotDefinition) -> Self {
        Self {
            name: s.name,
            start_time: s.start_time,
            end_time: s.end_time,
            capacity: s.capacity,
            enabled: s.enabled,
        }
    }
}

impl From<SlotDto> for SlotDefinition {
    fn from(s: SlotDto) -> Self {
        Self {
            name: s.name,
            start_time: s.start_time,
            end_time: s.end_time,
            capacity: s.capacity,
            enabled: s.enabled,
        }
    }
}

impl From<ClosedDate> for ClosedDateDto {
    fn from(c: ClosedDate) -> Self {
        Self {
            date: c.date,
            reason: c.reason,
        }
    }
}

impl From<ClosedDateInput> for ClosedDate {
    fn from(c: ClosedDateInput) -> Self {
        Self {
            date: c.date,
            // Blank reasons are normalized during patch validation.
            reason: c.reason.unwrap_or_default(),
        }
    }
}

impl From<FacilitySettings> for SettingsDto {
    fn from(s: FacilitySettings) -> Self {
        Self {
            slots: s.slots.into_iter().map(SlotDto::from).collect(),
            booking_enabled: s.booking_enabled,
            closed_dates: s.closed_dates.into_iter().map(ClosedDateDto::from).collect(),
            max_advance_booking_days: s.max_advance_booking_days,
            last_updated: s.last_updated,
            updated_by: s.updated_by,
        }
    }
}

impl From<UpdateSettingsReq> for SettingsPatch {
    fn from(req: UpdateSettingsReq) -> Self {
        Self {
            slots: req
                .slots
                .map(|v| v.into_iter().map(SlotDefinition::from).collect()),
            booking_enabled: req.booking_enabled,
            closed_dates: req
                .closed_dates
                .map(|v| v.into_iter().map(ClosedDate::from).collect()),
            max_advance_booking_days: req.max_advance_booking_days,
        }
    }
}

impl From<Vec<ClosedDate>> for ClosedDatesDto {
    fn from(list: Vec<ClosedDate>) -> Self {
        Self {
            closed_dates: list.into_iter().map(ClosedDateDto::from).collect(),
        }
    }
}

impl From<SlotAvailability> for SlotAvailabilityDto {
    fn from(s: SlotAvailability) -> Self {
        Self {
            name: s.name,
            start_time: s.start_time,
            end_time: s.end_time,
            capacity: s.capacity,
            booked: s.booked,
            remaining: s.remaining,
        }
    }
}

impl From<DayAvailability> for AvailabilityDto {
    fn from(d: DayAvailability) -> Self {
        Self {
            date: d.date,
            booking_enabled: d.booking_enabled,
            closure: d.closure.map(ClosedDateDto::from),
            slots: d.slots.into_iter().map(SlotAvailabilityDto::from).collect(),
        }
    }
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            slot: r.slot,
            created_at: r.created_at,
        }
    }
}

impl From<Vec<Reservation>> for ReservationListDto {
    fn from(list: Vec<Reservation>) -> Self {
        let reservations: Vec<ReservationDto> =
            list.into_iter().map(ReservationDto::from).collect();
        Self {
            total: reservations.len(),
            reservations,
        }
    }
}

impl From<IssuedToken> for IssuedTokenDto {
    fn from(t: IssuedToken) -> Self {
        Self {
            token: t.token,
            token_id: t.token_id,
            issued_at: t.issued_at,
            expires_at: t.expires_at,
        }
    }
}

impl From<AttendanceRecord> for AttendanceDto {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            reservation_id: r.reservation_id,
            date: r.date,
            slot: r.slot,
            check_in_time: r.check_in_time,
            scanned_by: r.scanned_by,
            status: r.status.as_str().to_string(),
            notes: r.notes,
        }
    }
}

impl From<Vec<AttendanceRecord>> for AttendanceListDto {
    fn from(list: Vec<AttendanceRecord>) -> Self {
        let attendance: Vec<AttendanceDto> = list.into_iter().map(AttendanceDto::from).collect();
        Self {
            total: attendance.len(),
            attendance,
        }
    }
}

impl From<ScanOutcome> for ScanResultDto {
    fn from(o: ScanOutcome) -> Self {
        match o {
            ScanOutcome::Recorded(rec) => Self {
                result: ScanResult::Recorded,
                attendance: rec.into(),
            },
            ScanOutcome::AlreadyCheckedIn(rec) => Self {
                result: ScanResult::AlreadyCheckedIn,
                attendance: rec.into(),
            },
        }
    }
}

impl From<SlotCount> for SlotCountDto {
    fn from(c: SlotCount) -> Self {
        Self {
            slot: c.slot,
            count: c.count,
        }
    }
}

impl From<AttendanceStats> for StatisticsDto {
    fn from(s: AttendanceStats) -> Self {
        Self {
            date: s.date,
            total_attendances: s.total_attendances,
            day_attendances: s.day_attendances,
            day_reservations: s.day_reservations,
            attendance_rate: s.attendance_rate,
            reservations_by_slot: s
                .reservations_by_slot
                .into_iter()
                .map(SlotCountDto::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date("date", "2026-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
        );
        let err = parse_date("date", "10/01/2026").unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "date"));
    }

    #[test]
    fn slot_enabled_defaults_to_true() {
        let s: SlotDto = serde_json::from_str(
            r#"{"name":"Morning","start_time":"08:00","end_time":"10:00","capacity":2}"#,
        )
        .unwrap();
        assert!(s.enabled);
    }

    #[test]
    fn unknown_patch_fields_are_rejected() {
        let parsed = serde_json::from_str::<UpdateSettingsReq>(r#"{"capacity": 3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_query_values_mean_no_filter() {
        let q = DaySlotQuery {
            date: Some(String::new()),
            slot: Some(String::new()),
        };
        assert_eq!(q.into_filter().unwrap(), DaySlotFilter::default());
    }

    #[test]
    fn scan_result_serializes_snake_case() {
        let v = serde_json::to_value(ScanResult::AlreadyCheckedIn).unwrap();
        assert_eq!(v, "already_checked_in");
    }
}
