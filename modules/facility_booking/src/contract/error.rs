use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FacilityBookingError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Booking is currently disabled")]
    BookingDisabled,

    #[error("Facility is closed on {date}")]
    DateClosed { date: NaiveDate },

    #[error("{date} is outside the advance booking window")]
    AdvanceWindowExceeded { date: NaiveDate },

    #[error("Slot '{slot}' does not exist or is disabled")]
    UnknownOrDisabledSlot { slot: String },

    #[error("Slot '{slot}' on {date} is full")]
    SlotFull { date: NaiveDate, slot: String },

    #[error("Slot '{slot}' on {date} is already reserved")]
    SlotDuplicate { date: NaiveDate, slot: String },

    #[error("{date} is in the past")]
    PastDate { date: NaiveDate },

    #[error("{date} is already closed")]
    DuplicateClosure { date: NaiveDate },

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {id}")]
    NotFound { id: Uuid },

    #[error("No reservation today")]
    NoReservation,

    #[error("Identity token signature is invalid")]
    SignatureInvalid,

    #[error("Identity token expired")]
    Expired,

    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for FacilityBookingError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::Validation {
                message: format!("{field}: {message}"),
            },
            BookingDisabled => Self::BookingDisabled,
            DateClosed { date, .. } => Self::DateClosed { date },
            AdvanceWindowExceeded { date, .. } => Self::AdvanceWindowExceeded { date },
            UnknownOrDisabledSlot { slot } => Self::UnknownOrDisabledSlot { slot },
            SlotFull { date, slot, .. } => Self::SlotFull { date, slot },
            SlotDuplicate { date, slot } => Self::SlotDuplicate { date, slot },
            PastDate { date } => Self::PastDate { date },
            DuplicateClosure { date } => Self::DuplicateClosure { date },
            Forbidden { .. } => Self::Forbidden,
            ReservationNotFound { id } | MemberNotFound { id } => Self::NotFound { id },
            NoReservation { .. } => Self::NoReservation,
            SignatureInvalid => Self::SignatureInvalid,
            Expired { .. } => Self::Expired,
            Database { .. } | Upstream { .. } => Self::Internal,
        }
    }
}
