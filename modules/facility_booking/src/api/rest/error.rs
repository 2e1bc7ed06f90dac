use axum::extract::rejection::JsonRejection;
use problem::{ErrDef, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

macro_rules! catalog {
    ($($name:ident => ($status:literal, $title:literal, $code:literal)),+ $(,)?) => {
        $(
            pub const $name: ErrDef = ErrDef {
                status: $status,
                title: $title,
                code: $code,
                type_url: concat!("https://errors.turnstile.dev/", $code),
            };
        )+
    };
}

catalog! {
    VALIDATION => (400, "Validation error", "FACILITY_VALIDATION"),
    BOOKING_DISABLED => (409, "Booking disabled", "FACILITY_BOOKING_DISABLED"),
    DATE_CLOSED => (409, "Date closed", "FACILITY_DATE_CLOSED"),
    ADVANCE_WINDOW_EXCEEDED => (422, "Outside booking window", "FACILITY_ADVANCE_WINDOW_EXCEEDED"),
    UNKNOWN_SLOT => (422, "Unknown or disabled slot", "FACILITY_UNKNOWN_SLOT"),
    SLOT_FULL => (409, "Slot full", "FACILITY_SLOT_FULL"),
    SLOT_DUPLICATE => (409, "Already reserved", "FACILITY_SLOT_DUPLICATE"),
    PAST_DATE => (422, "Date in the past", "FACILITY_PAST_DATE"),
    DUPLICATE_CLOSURE => (409, "Date already closed", "FACILITY_DUPLICATE_CLOSURE"),
    FORBIDDEN => (403, "Forbidden", "FACILITY_FORBIDDEN"),
    NOT_FOUND => (404, "Not found", "FACILITY_NOT_FOUND"),
    NO_RESERVATION => (404, "No reservation today", "FACILITY_NO_RESERVATION"),
    TOKEN_INVALID => (401, "Invalid identity token", "FACILITY_TOKEN_INVALID"),
    TOKEN_EXPIRED => (401, "Identity token expired", "FACILITY_TOKEN_EXPIRED"),
    UNAUTHENTICATED => (401, "Unauthenticated", "FACILITY_UNAUTHENTICATED"),
    INTERNAL => (500, "Internal error", "FACILITY_INTERNAL"),
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { field, message } => {
            let ProblemResponse(problem) = VALIDATION.to_response(e.to_string(), instance);
            ProblemResponse(problem.with_errors(vec![ValidationError {
                detail: message.clone(),
                pointer: json_pointer(field),
            }]))
        }
        DomainError::BookingDisabled => BOOKING_DISABLED.to_response(e.to_string(), instance),
        DomainError::DateClosed { .. } => DATE_CLOSED.to_response(e.to_string(), instance),
        DomainError::AdvanceWindowExceeded { .. } => {
            ADVANCE_WINDOW_EXCEEDED.to_response(e.to_string(), instance)
        }
        DomainError::UnknownOrDisabledSlot { .. } => {
            UNKNOWN_SLOT.to_response(e.to_string(), instance)
        }
        DomainError::SlotFull { .. } => SLOT_FULL.to_response(e.to_string(), instance),
        DomainError::SlotDuplicate { .. } => SLOT_DUPLICATE.to_response(e.to_string(), instance),
        DomainError::PastDate { .. } => PAST_DATE.to_response(e.to_string(), instance),
        DomainError::DuplicateClosure { .. } => {
            DUPLICATE_CLOSURE.to_response(e.to_string(), instance)
        }
        DomainError::Forbidden { .. } => FORBIDDEN.to_response(e.to_string(), instance),
        DomainError::ReservationNotFound { .. } | DomainError::MemberNotFound { .. } => {
            NOT_FOUND.to_response(e.to_string(), instance)
        }
        DomainError::NoReservation { .. } => NO_RESERVATION.to_response(e.to_string(), instance),
        DomainError::SignatureInvalid => TOKEN_INVALID.to_response(e.to_string(), instance),
        DomainError::Expired { .. } => TOKEN_EXPIRED.to_response(e.to_string(), instance),
        DomainError::Database { .. } | DomainError::Upstream { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Infrastructure error occurred");
            INTERNAL.to_response("An internal error occurred", instance)
        }
    }
}

/// Malformed or mistyped request bodies are validation failures.
pub fn map_json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    VALIDATION.to_response(rejection.body_text(), instance)
}

/// `slots[0].capacity` -> `/slots/0/capacity`
fn json_pointer(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 1);
    for part in field.split('.') {
        out.push('/');
        match part.split_once('[') {
            Some((name, rest)) => {
                out.push_str(name);
                out.push('/');
                out.push_str(rest.trim_end_matches(']'));
            }
            None => out.push_str(part),
        }
    }
    out
}
