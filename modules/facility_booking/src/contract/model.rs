use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Role of the caller as asserted by the identity gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Member,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" | "user" => Some(Role::Member),
            "staff" | "admin" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// Authenticated caller. Trusted as-is; credentials are validated upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn member(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Member,
        }
    }

    pub fn staff(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Staff,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}

/// A named daily time window. Times are facility-local `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDefinition {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// The singleton facility configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilitySettings {
    /// Ordered; the order is the display and scan-resolution order.
    pub slots: Vec<SlotDefinition>,
    pub booking_enabled: bool,
    /// Sorted by date.
    pub closed_dates: Vec<ClosedDate>,
    pub max_advance_booking_days: u32,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl FacilitySettings {
    pub fn slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn closure_on(&self, date: NaiveDate) -> Option<&ClosedDate> {
        self.closed_dates.iter().find(|c| c.date == date)
    }
}

/// Partial update: only present fields are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    pub slots: Option<Vec<SlotDefinition>>,
    pub booking_enabled: Option<bool>,
    pub closed_dates: Option<Vec<ClosedDate>>,
    pub max_advance_booking_days: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.slots.is_none()
            && self.booking_enabled.is_none()
            && self.closed_dates.is_none()
            && self.max_advance_booking_days.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    pub created_at: DateTime<Utc>,
}

/// Optional date/slot narrowing used by the staff listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySlotFilter {
    pub date: Option<NaiveDate>,
    pub slot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    pub booked: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub booking_enabled: bool,
    pub closure: Option<ClosedDate>,
    pub slots: Vec<SlotAvailability>,
}

/// Display fields of a member, owned by the external account service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub registration_no: Option<String>,
    pub index_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "late" => Some(AttendanceStatus::Late),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reservation_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
    pub check_in_time: DateTime<Utc>,
    pub scanned_by: Uuid,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Result of a successful token scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A new attendance record was written.
    Recorded(AttendanceRecord),
    /// Every matching reservation was already checked in; carries the existing record.
    AlreadyCheckedIn(AttendanceRecord),
}

impl ScanOutcome {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            ScanOutcome::Recorded(r) | ScanOutcome::AlreadyCheckedIn(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCount {
    pub slot: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceStats {
    pub date: NaiveDate,
    pub total_attendances: u64,
    pub day_attendances: u64,
    pub day_reservations: u64,
    /// Percentage of today's reservations checked in, one decimal.
    pub attendance_rate: f64,
    pub reservations_by_slot: Vec<SlotCount>,
}
