use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Booking is currently disabled")]
    BookingDisabled,

    #[error("Facility is closed on {date}: {reason}")]
    DateClosed { date: NaiveDate, reason: String },

    #[error("{date} is more than {max_days} days ahead")]
    AdvanceWindowExceeded { date: NaiveDate, max_days: u32 },

    #[error("Slot '{slot}' does not exist or is disabled")]
    UnknownOrDisabledSlot { slot: String },

    #[error("Slot '{slot}' on {date} is full (capacity {capacity})")]
    SlotFull {
        date: NaiveDate,
        slot: String,
        capacity: u32,
    },

    #[error("Slot '{slot}' on {date} is already reserved by this user")]
    SlotDuplicate { date: NaiveDate, slot: String },

    #[error("{date} is in the past")]
    PastDate { date: NaiveDate },

    #[error("{date} is already closed")]
    DuplicateClosure { date: NaiveDate },

    #[error("Not allowed to {action}")]
    Forbidden { action: String },

    #[error("Reservation not found: {id}")]
    ReservationNotFound { id: Uuid },

    #[error("Member not found: {id}")]
    MemberNotFound { id: Uuid },

    #[error("No reservation for member {user_id} on {date}")]
    NoReservation { user_id: Uuid, date: NaiveDate },

    #[error("Identity token signature is invalid")]
    SignatureInvalid,

    #[error("Identity token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Upstream service error: {message}")]
    Upstream { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn date_closed(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::DateClosed {
            date,
            reason: reason.into(),
        }
    }

    pub fn unknown_slot(slot: impl Into<String>) -> Self {
        Self::UnknownOrDisabledSlot { slot: slot.into() }
    }

    pub fn slot_full(date: NaiveDate, slot: impl Into<String>, capacity: u32) -> Self {
        Self::SlotFull {
            date,
            slot: slot.into(),
            capacity,
        }
    }

    pub fn slot_duplicate(date: NaiveDate, slot: impl Into<String>) -> Self {
        Self::SlotDuplicate {
            date,
            slot: slot.into(),
        }
    }

    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    pub fn reservation_not_found(id: Uuid) -> Self {
        Self::ReservationNotFound { id }
    }

    pub fn member_not_found(id: Uuid) -> Self {
        Self::MemberNotFound { id }
    }

    pub fn no_reservation(user_id: Uuid, date: NaiveDate) -> Self {
        Self::NoReservation { user_id, date }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Infrastructure failures are logged and masked at the boundary.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Upstream { .. })
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        // Repository ports report storage failures through anyhow.
        Self::database(format!("{e:#}"))
    }
}
